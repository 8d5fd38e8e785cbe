use chrono::{NaiveDate, TimeZone, Utc};
use fitout_timeline::models::Task;
use fitout_timeline::normalize::{decode_records, normalize_date, normalize_list};
use serde_json::{json, Value};

#[test]
fn test_parses_common_date_shapes() {
    let midnight = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    assert_eq!(normalize_date(&json!("2024-01-10")), Some(midnight));
    assert_eq!(normalize_date(&json!("2024-01-10T00:00:00.000Z")), Some(midnight));
    assert_eq!(normalize_date(&json!("2024-01-10T02:00:00+02:00")), Some(midnight));
    assert_eq!(normalize_date(&json!("2024-01-10T00:00:00")), Some(midnight));
    assert_eq!(normalize_date(&json!(midnight.timestamp_millis())), Some(midnight));
    assert_eq!(normalize_date(&NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()), Some(midnight));
    assert_eq!(normalize_date(&midnight), Some(midnight));
    assert_eq!(normalize_date("2024-01-10"), Some(midnight));
}

#[test]
fn test_bad_input_is_absent() {
    for value in [
        Value::Null,
        json!(""),
        json!("   "),
        json!("not a date"),
        json!("2024-02-30"),
        json!("2024-13-01"),
        json!(true),
        json!([]),
        json!({}),
        json!(0),
    ] {
        assert_eq!(normalize_date(&value), None, "{}", value);
    }
    let missing: Option<String> = None;
    assert_eq!(normalize_date(&missing), None);
}

#[test]
fn test_list_envelopes() {
    let items = json!([{ "_id": "a" }, { "_id": "b" }]);
    assert_eq!(normalize_list(items.clone()).len(), 2);
    assert_eq!(normalize_list(json!({ "success": true, "data": items.clone() })).len(), 2);
    assert_eq!(normalize_list(json!({ "data": { "data": items, "total": 2 } })).len(), 2);
    assert!(normalize_list(json!({ "data": "nope" })).is_empty());
    assert!(normalize_list(Value::Null).is_empty());
    assert!(normalize_list(json!({ "message": "ok" })).is_empty());
}

#[test]
fn test_decode_tolerates_odd_fields() {
    let res = json!({ "data": [
        { "_id": "t1", "title": "Paint", "status": "mystery", "progress": "lots", "property": { "_id": "p1", "address": "12 Nile St" } },
        { "_id": "t2", "title": "Tile", "status": "on-hold", "priority": "urgent", "progress": 55, "property": "p2" },
        "garbage"
    ]});
    let tasks: Vec<Task> = decode_records(res, "task");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].status, Default::default());
    assert_eq!(tasks[0].progress, None);
    assert_eq!(tasks[0].property.as_ref().map(|p| p.id()), Some("p1"));
    assert_eq!(tasks[1].progress, Some(55));
    assert_eq!(tasks[1].property.as_ref().map(|p| p.id()), Some("p2"));
}
