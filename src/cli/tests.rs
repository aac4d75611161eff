use super::*;
use std::fs;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["matrix-terminal"]);
    assert!(args.command.is_none());
    assert!(!args.post);
    assert!(!args.no_webhook);
    assert!(!args.debug);
}

#[test]
fn global_flags_parse_before_and_after_subcommand() {
    for argv in [
        &["matrix-terminal", "--debug", "--post", "chat"][..],
        &["matrix-terminal", "chat", "--debug", "--post"][..],
    ] {
        let args = parse_args(argv);
        assert_eq!(args.command, Some(Commands::Chat), "argv={argv:?}");
        assert!(args.debug, "argv={argv:?}");
        assert!(args.post, "argv={argv:?}");
    }
}

#[test]
fn short_flags_parse() {
    let args = parse_args(&[
        "matrix-terminal",
        "-u",
        "http://localhost:5678/webhook/chat",
        "-l",
        "session.log",
        "-d",
    ]);
    assert_eq!(
        args.webhook_url.as_deref(),
        Some("http://localhost:5678/webhook/chat")
    );
    assert_eq!(args.log, Some(PathBuf::from("session.log")));
    assert!(args.debug);
}

#[test]
fn say_collects_trailing_words() {
    let args = parse_args(&["matrix-terminal", "say", "what", "is", "-the-", "matrix"]);
    assert_eq!(
        args.command,
        Some(Commands::Say {
            text: vec![
                "what".to_string(),
                "is".to_string(),
                "-the-".to_string(),
                "matrix".to_string(),
            ],
        })
    );
}

#[test]
fn say_requires_text() {
    assert!(Args::try_parse_from(["matrix-terminal", "say"]).is_err());
}

#[test]
fn set_and_unset_take_keys() {
    let args = parse_args(&["matrix-terminal", "set", "webhook.use_post", "true"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "webhook.use_post".to_string(),
            value: "true".to_string(),
        })
    );

    let args = parse_args(&["matrix-terminal", "unset", "webhook.url"]);
    assert_eq!(
        args.command,
        Some(Commands::Unset {
            key: "webhook.url".to_string(),
        })
    );
}

#[test]
fn cli_overrides_win_over_file_values() {
    let mut config = Config::default();
    config.webhook.url = Some("http://from-file.example/webhook".to_string());

    let args = parse_args(&[
        "matrix-terminal",
        "--webhook-url",
        "http://localhost:5678/webhook/chat",
        "--post",
        "--no-webhook",
        "--debug",
    ]);
    apply_cli_overrides(&mut config, &args).expect("overrides apply");

    assert_eq!(
        config.webhook_url(),
        Some("http://localhost:5678/webhook/chat")
    );
    assert!(config.webhook.use_post);
    assert!(!config.features.webhook_enabled);
    assert!(config.features.debugging);
}

#[test]
fn absent_flags_leave_config_alone() {
    let mut config = Config::default();
    config.webhook.use_post = true;
    config.features.debugging = true;

    let args = parse_args(&["matrix-terminal"]);
    apply_cli_overrides(&mut config, &args).expect("overrides apply");

    assert!(config.webhook.use_post);
    assert!(config.features.debugging);
    assert!(config.features.webhook_enabled);
}

#[test]
fn invalid_webhook_url_flag_is_rejected() {
    let mut config = Config::default();
    let args = parse_args(&["matrix-terminal", "--webhook-url", "not a url"]);
    assert!(apply_cli_overrides(&mut config, &args).is_err());
}

#[test]
fn effective_config_reads_explicit_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[ui]\nuser_name = \"Trinity\"\n\n[features]\nsound_effects = false\n",
    )
    .expect("write config");

    let path_arg = path.to_string_lossy().to_string();
    let args = parse_args(&["matrix-terminal", "--config", &path_arg, "--debug"]);
    let config = effective_config(&args).expect("config loads");

    assert_eq!(config.ui.user_name, "Trinity");
    assert!(!config.features.sound_effects);
    assert!(config.features.debugging);
}
