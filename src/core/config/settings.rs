//! Key-based editing used by `matrix-terminal set|unset|config`.

use crate::core::config::data::{Config, Environment};
use crate::core::config::io::ConfigError;

pub const SETTABLE_KEYS: &[&str] = &[
    "environment",
    "webhook.url",
    "webhook.timeout_ms",
    "webhook.retry_attempts",
    "webhook.retry_delay_ms",
    "webhook.use_post",
    "features.webhook_enabled",
    "features.fallback_to_mock",
    "features.sound_effects",
    "features.debugging",
    "ui.max_messages",
    "ui.typing_speed_ms",
    "ui.initial_probe_delay_ms",
    "ui.user_name",
];

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(invalid(key, format!("expected true/false, got '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, format!("expected a non-negative integer, got '{value}'")))
}

impl Config {
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "environment" => {
                self.environment = Some(match value.trim().to_ascii_lowercase().as_str() {
                    "local" => Environment::Local,
                    "production" => Environment::Production,
                    other => return Err(invalid(key, format!("expected local/production, got '{other}'"))),
                });
            }
            "webhook.url" => {
                let url = value.trim();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(invalid(key, "URL must start with http:// or https://"));
                }
                self.webhook.url = Some(url.to_string());
            }
            "webhook.timeout_ms" => {
                let timeout: u64 = parse_number(key, value)?;
                if timeout == 0 {
                    return Err(invalid(key, "timeout must be greater than zero"));
                }
                self.webhook.timeout_ms = timeout;
            }
            "webhook.retry_attempts" => self.webhook.retry_attempts = parse_number(key, value)?,
            "webhook.retry_delay_ms" => self.webhook.retry_delay_ms = parse_number(key, value)?,
            "webhook.use_post" => self.webhook.use_post = parse_bool(key, value)?,
            "features.webhook_enabled" => self.features.webhook_enabled = parse_bool(key, value)?,
            "features.fallback_to_mock" => self.features.fallback_to_mock = parse_bool(key, value)?,
            "features.sound_effects" => self.features.sound_effects = parse_bool(key, value)?,
            "features.debugging" => self.features.debugging = parse_bool(key, value)?,
            "ui.max_messages" => {
                let max: usize = parse_number(key, value)?;
                if max == 0 {
                    return Err(invalid(key, "must keep at least one message"));
                }
                self.ui.max_messages = max;
            }
            "ui.typing_speed_ms" => self.ui.typing_speed_ms = parse_number(key, value)?,
            "ui.initial_probe_delay_ms" => {
                self.ui.initial_probe_delay_ms = parse_number(key, value)?
            }
            "ui.user_name" => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(invalid(key, "name cannot be empty"));
                }
                self.ui.user_name = name.to_string();
            }
            _ => return Err(invalid(key, "unknown key")),
        }
        Ok(())
    }

    /// Reset `key` to its default.
    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigError> {
        let defaults = Config::default();
        match key {
            "environment" => self.environment = None,
            "webhook.url" => self.webhook.url = None,
            "webhook.timeout_ms" => self.webhook.timeout_ms = defaults.webhook.timeout_ms,
            "webhook.retry_attempts" => {
                self.webhook.retry_attempts = defaults.webhook.retry_attempts
            }
            "webhook.retry_delay_ms" => {
                self.webhook.retry_delay_ms = defaults.webhook.retry_delay_ms
            }
            "webhook.use_post" => self.webhook.use_post = defaults.webhook.use_post,
            "features.webhook_enabled" => {
                self.features.webhook_enabled = defaults.features.webhook_enabled
            }
            "features.fallback_to_mock" => {
                self.features.fallback_to_mock = defaults.features.fallback_to_mock
            }
            "features.sound_effects" => {
                self.features.sound_effects = defaults.features.sound_effects
            }
            "features.debugging" => self.features.debugging = defaults.features.debugging,
            "ui.max_messages" => self.ui.max_messages = defaults.ui.max_messages,
            "ui.typing_speed_ms" => self.ui.typing_speed_ms = defaults.ui.typing_speed_ms,
            "ui.initial_probe_delay_ms" => {
                self.ui.initial_probe_delay_ms = defaults.ui.initial_probe_delay_ms
            }
            "ui.user_name" => self.ui.user_name = defaults.ui.user_name,
            _ => return Err(invalid(key, "unknown key")),
        }
        Ok(())
    }

    /// `key = value` lines for every settable key.
    pub fn describe(&self) -> Vec<String> {
        let environment = match self.environment {
            Some(environment) => environment.label().to_lowercase(),
            None => format!("(auto: {})", self.environment().label().to_lowercase()),
        };
        vec![
            format!("environment = {environment}"),
            format!(
                "webhook.url = {}",
                self.webhook.url.as_deref().unwrap_or("(not set)")
            ),
            format!("webhook.timeout_ms = {}", self.webhook.timeout_ms),
            format!("webhook.retry_attempts = {}", self.webhook.retry_attempts),
            format!("webhook.retry_delay_ms = {}", self.webhook.retry_delay_ms),
            format!("webhook.use_post = {}", self.webhook.use_post),
            format!("features.webhook_enabled = {}", self.features.webhook_enabled),
            format!("features.fallback_to_mock = {}", self.features.fallback_to_mock),
            format!("features.sound_effects = {}", self.features.sound_effects),
            format!("features.debugging = {}", self.features.debugging),
            format!("ui.max_messages = {}", self.ui.max_messages),
            format!("ui.typing_speed_ms = {}", self.ui.typing_speed_ms),
            format!("ui.initial_probe_delay_ms = {}", self.ui.initial_probe_delay_ms),
            format!("ui.user_name = {}", self.ui.user_name),
        ]
    }
}
