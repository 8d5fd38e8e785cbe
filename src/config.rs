use std::path::PathBuf;
use std::time::Duration;

use crate::api::{RequestContext, DEFAULT_BASE_URL};
use crate::locale::Locale;

/// Runtime settings, resolved from command-line flags and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub locale: Locale,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            locale: Locale::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Builds a config from optional overrides; missing values use defaults.
    ///
    /// Flag parsing (including the `TIMELINE_*` environment fallbacks) is
    /// done by the CLI layer.
    pub fn new(api_url: Option<String>, token: Option<String>, locale: Option<String>) -> Config {
        let mut cfg = Config::default();
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            cfg.api_url = url;
        }
        cfg.token = token.filter(|t| !t.trim().is_empty());
        if let Some(l) = locale {
            match Locale::parse(&l) {
                Some(parsed) => cfg.locale = parsed,
                None => log::warn!("Unknown locale '{}', falling back to English", l),
            }
        }
        cfg
    }

    /// The context injected into every API request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            base_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout: self.timeout,
        }
    }
}

/// Directory holding the snapshot and the TUI log.
///
/// Follows `TIMELINE_DB` when set, otherwise the platform data directory.
pub fn data_dir() -> PathBuf {
    match std::env::var("TIMELINE_DB") {
        Ok(p) => {
            let mut p = PathBuf::from(p);
            p.pop();
            p
        }
        Err(_) => {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("fitout-timeline");
            p
        }
    }
}
