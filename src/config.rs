use std::env;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub backend_url: String,
    /// Idle seconds before a page session is evicted.
    pub session_ttl_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            bind_addr: value("REVIEW_LENS_BIND", DEFAULT_BIND),
            backend_url: value("REVIEW_LENS_BACKEND", DEFAULT_BACKEND),
            session_ttl_secs: lookup("REVIEW_LENS_SESSION_TTL_SECS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
        }
    }
}
