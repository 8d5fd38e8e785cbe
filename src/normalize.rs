use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Anything an upstream record may use to carry a date.
///
/// Implementations never panic: a value that does not describe a valid
/// calendar date yields `None`.
pub trait DateLike {
    fn to_instant(&self) -> Option<DateTime<Utc>>;
}

impl DateLike for str {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        let s = self.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        // Timestamps without an offset are read as UTC.
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().to_instant()
    }
}

impl DateLike for String {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        self.as_str().to_instant()
    }
}

/// Milliseconds since the Unix epoch. Zero counts as missing.
impl DateLike for i64 {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        if *self == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(*self)
    }
}

impl DateLike for f64 {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        if !self.is_finite() || self.abs() > i64::MAX as f64 {
            return None;
        }
        (self.trunc() as i64).to_instant()
    }
}

impl DateLike for DateTime<Utc> {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl DateLike for NaiveDate {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        Some(self.and_hms_opt(0, 0, 0)?.and_utc())
    }
}

impl<T: DateLike> DateLike for Option<T> {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(|v| v.to_instant())
    }
}

impl DateLike for Value {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::String(s) => s.to_instant(),
            Value::Number(n) => match n.as_i64() {
                Some(ms) => ms.to_instant(),
                None => n.as_f64().to_instant(),
            },
            _ => None,
        }
    }
}

/// Coerces any date-like value into a valid instant, or `None` when it is
/// missing, empty or unparseable.
pub fn normalize_date<T: DateLike + ?Sized>(value: &T) -> Option<DateTime<Utc>> {
    value.to_instant()
}

/// Extracts the record array from a list response.
///
/// The API answers with a bare array, `{ "data": [...] }` or
/// `{ "data": { "data": [...] } }`; any other shape is an empty list.
pub fn normalize_list(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut inner)) => match inner.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Decodes every record of a list response, skipping items that are not
/// objects of the expected shape.
pub fn decode_records<T: DeserializeOwned>(response: Value, kind: &str) -> Vec<T> {
    normalize_list(response)
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect()
}
