use super::data::{Config, Environment, WEBHOOK_URL_ENV};
use super::io::ConfigError;
use super::settings::SETTABLE_KEYS;
use std::collections::HashMap;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.webhook.timeout_ms, 30_000);
    assert!(config.features.webhook_enabled);
    assert!(config.features.fallback_to_mock);
    assert!(!config.features.debugging);
    assert_eq!(config.ui.max_messages, 100);
}

#[test]
fn partial_file_keeps_defaults_for_missing_fields() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[webhook]\nurl = \"https://n8n.example.com/webhook/chat\"\nuse_post = true\n",
    )
    .expect("write config");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(
        config.webhook_url(),
        Some("https://n8n.example.com/webhook/chat")
    );
    assert!(config.webhook.use_post);
    assert_eq!(config.webhook.timeout_ms, 30_000);
    assert_eq!(config.ui.typing_speed_ms, 50);
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[webhook\nurl = ").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set_value("webhook.url", "http://localhost:5678/webhook/chat")
        .expect("set url");
    config.set_value("features.debugging", "on").expect("set debug");
    config.save_to_path(&config_path).expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    loaded.unset_value("webhook.url").expect("unset url");
    loaded.save_to_path(&config_path).expect("Failed to save config");
    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.webhook.url, None);
    assert!(reloaded.features.debugging);
}

#[test]
fn env_override_replaces_file_url() {
    let mut config = Config::default();
    config.webhook.url = Some("https://file.example.com/hook".to_string());

    let env: HashMap<&str, &str> =
        HashMap::from([(WEBHOOK_URL_ENV, " https://env.example.com/hook ")]);
    config.apply_env_overrides(|key| env.get(key).map(|value| value.to_string()));

    assert_eq!(config.webhook_url(), Some("https://env.example.com/hook"));
}

#[test]
fn blank_env_override_is_ignored() {
    let mut config = Config::default();
    config.webhook.url = Some("https://file.example.com/hook".to_string());
    config.apply_env_overrides(|_| Some("   ".to_string()));
    assert_eq!(config.webhook_url(), Some("https://file.example.com/hook"));
}

#[test]
fn environment_is_guessed_from_webhook_host() {
    let mut config = Config::default();
    assert_eq!(config.environment(), Environment::Local);

    config.webhook.url = Some("http://127.0.0.1:5678/webhook".to_string());
    assert_eq!(config.environment(), Environment::Local);

    config.webhook.url = Some("https://n8n.example.com/webhook".to_string());
    assert_eq!(config.environment(), Environment::Production);

    config.environment = Some(Environment::Local);
    assert_eq!(config.environment(), Environment::Local);
}

#[test]
fn set_value_rejects_bad_input() {
    let mut config = Config::default();
    assert!(config.set_value("webhook.url", "ftp://example.com").is_err());
    assert!(config.set_value("webhook.timeout_ms", "0").is_err());
    assert!(config.set_value("webhook.timeout_ms", "-5").is_err());
    assert!(config.set_value("features.debugging", "maybe").is_err());
    assert!(config.set_value("ui.max_messages", "0").is_err());
    assert!(config.set_value("no.such.key", "1").is_err());
    assert_eq!(config, Config::default());
}

#[test]
fn every_settable_key_can_be_unset() {
    let mut config = Config::default();
    for key in SETTABLE_KEYS {
        config.unset_value(key).expect("known key");
    }
    assert_eq!(config, Config::default());
    assert_eq!(config.describe().len(), SETTABLE_KEYS.len());
}
