use std::env;
use std::time::Duration;

use portfolio_logging::{mask_secret, portfolio_info, portfolio_warn};

pub const ENV_BACKEND_URL: &str = "PORTFOLIO_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "PORTFOLIO_BACKEND_ANON_KEY";
pub const ENV_LOAD_DEADLINE_MS: &str = "PORTFOLIO_LOAD_DEADLINE_MS";

pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";
pub const PLACEHOLDER_KEY: &str = "placeholder-key";

/// Soft deadline for the live fetch before the view settles on cache or fallback.
pub const DEFAULT_LOAD_DEADLINE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub anon_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub load_deadline: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: PLACEHOLDER_URL.to_string(),
            anon_key: PLACEHOLDER_KEY.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            load_deadline: DEFAULT_LOAD_DEADLINE,
        }
    }
}

impl BackendSettings {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            ..Self::default()
        }
    }

    /// Reads settings from the process environment, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        match lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            Some(url) => settings.base_url = url.trim().trim_end_matches('/').to_string(),
            None => portfolio_info!("{ENV_BACKEND_URL} not set, using placeholder"),
        }
        match lookup(ENV_BACKEND_ANON_KEY).filter(|v| !v.trim().is_empty()) {
            Some(key) => settings.anon_key = key.trim().to_string(),
            None => portfolio_info!("{ENV_BACKEND_ANON_KEY} not set, using placeholder"),
        }
        if let Some(raw) = lookup(ENV_LOAD_DEADLINE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => settings.load_deadline = Duration::from_millis(ms),
                Err(err) => portfolio_warn!(
                    "Invalid {ENV_LOAD_DEADLINE_MS} value {raw:?}: {err}; keeping {:?}",
                    settings.load_deadline
                ),
            }
        }
        settings
    }

    /// True when both URL and key are set to something other than the placeholders.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
            && !self.anon_key.is_empty()
            && self.base_url != PLACEHOLDER_URL
            && self.anon_key != PLACEHOLDER_KEY
    }

    pub fn config_warning(&self) -> Option<String> {
        if self.is_configured() {
            return None;
        }
        Some(format!(
            "Backend appears to be unconfigured. Please set {ENV_BACKEND_URL} and {ENV_BACKEND_ANON_KEY} in your environment."
        ))
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let shown_key = if self.anon_key == PLACEHOLDER_KEY {
            String::new()
        } else {
            self.anon_key.clone()
        };
        Diagnostics {
            backend_url: self.base_url.clone(),
            anon_key: mask_secret(&shown_key, 20),
            configured: self.is_configured(),
            load_deadline: self.load_deadline,
        }
    }
}

/// Environment status safe to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub backend_url: String,
    pub anon_key: String,
    pub configured: bool,
    pub load_deadline: Duration,
}
