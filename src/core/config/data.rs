use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::url::is_local_host;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_MESSAGES: usize = 100;
pub const DEFAULT_TYPING_SPEED_MS: u64 = 50;
pub const DEFAULT_INITIAL_PROBE_DELAY_MS: u64 = 4_000;
pub const DEFAULT_USER_NAME: &str = "Neo";

/// Environment variable that overrides `webhook.url`.
pub const WEBHOOK_URL_ENV: &str = "MATRIX_TERMINAL_WEBHOOK_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WebhookSettings {
    pub url: Option<String>,
    pub timeout_ms: u64,
    /// Extra attempts after a network or 5xx failure.
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// POST a JSON body instead of GET with a query parameter.
    pub use_post: bool,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            use_post: false,
        }
    }
}

impl WebhookSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Startup values for the runtime-toggleable session flags.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureSettings {
    pub webhook_enabled: bool,
    pub fallback_to_mock: bool,
    pub sound_effects: bool,
    pub debugging: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            webhook_enabled: true,
            fallback_to_mock: true,
            sound_effects: true,
            debugging: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UiSettings {
    pub max_messages: usize,
    pub typing_speed_ms: u64,
    pub initial_probe_delay_ms: u64,
    pub user_name: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            typing_speed_ms: DEFAULT_TYPING_SPEED_MS,
            initial_probe_delay_ms: DEFAULT_INITIAL_PROBE_DELAY_MS,
            user_name: DEFAULT_USER_NAME.to_string(),
        }
    }
}

impl UiSettings {
    pub fn typing_speed(&self) -> Duration {
        Duration::from_millis(self.typing_speed_ms)
    }

    pub fn initial_probe_delay(&self) -> Duration {
        Duration::from_millis(self.initial_probe_delay_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn label(self) -> &'static str {
        match self {
            Environment::Local => "LOCAL",
            Environment::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Overrides the host-based environment guess shown by `/status`.
    pub environment: Option<Environment>,
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub features: FeatureSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

impl Config {
    /// Explicit setting, otherwise LOCAL when the webhook points at this machine
    /// (or is unset) and PRODUCTION for anything else.
    pub fn environment(&self) -> Environment {
        if let Some(environment) = self.environment {
            return environment;
        }
        match self.webhook.url.as_deref() {
            None => Environment::Local,
            Some(url) if is_local_host(url) => Environment::Local,
            Some(_) => Environment::Production,
        }
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
