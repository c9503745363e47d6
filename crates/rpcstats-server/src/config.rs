//! Server configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APPLICATION_ID: &str = "rpcstats";
const DEFAULT_STATIC_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,
    /// Application identifier shown on every page.
    pub application_id: String,
    /// Bearer token that grants administrator access.
    pub admin_token: Option<String>,
    /// Admit every caller without credentials.
    pub dev_mode: bool,
    /// SQLite cache file. `None` uses an in-process cache.
    pub cache_path: Option<PathBuf>,
    /// Lifetime advertised for static assets, capped at one year when served.
    pub static_max_age: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            admin_token: None,
            dev_mode: false,
            cache_path: None,
            static_max_age: DEFAULT_STATIC_MAX_AGE,
        }
    }
}

impl ServerConfig {
    /// Reads the `RPCSTATS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    ///
    /// Empty values count as unset; malformed values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let dev_mode = match get("RPCSTATS_DEV_MODE") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Invalid RPCSTATS_DEV_MODE, using default");
                defaults.dev_mode
            }),
            None => defaults.dev_mode,
        };

        let static_max_age = match get("RPCSTATS_STATIC_MAX_AGE_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Duration::from_secs)
                .unwrap_or_else(|_| {
                    warn!(value = %raw, "Invalid RPCSTATS_STATIC_MAX_AGE_SECS, using default");
                    defaults.static_max_age
                }),
            None => defaults.static_max_age,
        };

        Self {
            bind_addr: get("RPCSTATS_BIND_ADDR").unwrap_or(defaults.bind_addr),
            application_id: get("RPCSTATS_APPLICATION_ID").unwrap_or(defaults.application_id),
            admin_token: get("RPCSTATS_ADMIN_TOKEN"),
            dev_mode,
            cache_path: get("RPCSTATS_CACHE_PATH").map(PathBuf::from),
            static_max_age,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
