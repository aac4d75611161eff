//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments, setting up logging and
//! executing the selected subcommand.

pub mod say;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::fs::{self, File};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::say::run_say;
use crate::core::config::data::{path_display, WEBHOOK_URL_ENV};
use crate::core::config::{Config, ConfigError};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::LoggingState;
use crate::webhook::WebhookClient;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

/// Always capped, whatever `RUST_LOG` asks for.
const NOISY_CRATE_FILTERS: &str = ",hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

#[derive(Parser, Debug)]
#[command(name = "matrix-terminal")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A Matrix-themed terminal chat client for n8n-style webhooks")]
#[command(
    long_about = "Matrix Terminal is a full-screen terminal chat client. Every message is sent \
to a single webhook (GET with a chatInput query parameter, or POST with a JSON body) and the \
reply is typed out on screen. When the webhook is disabled or fails, a local responder answers \
instead.\n\n\
Environment Variables:\n\
  MATRIX_TERMINAL_WEBHOOK_URL   Webhook URL (overrides the config file)\n\
  RUST_LOG                      Diagnostic log filter (e.g. matrix_terminal=debug)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Up/Down           Browse previously sent input\n\
  Ctrl+U/K/W        Clear line / delete to end / delete word\n\
  Esc, Ctrl+C       Quit\n\n\
Type /help inside the terminal for the list of commands."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Webhook URL for this run
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// POST a JSON body instead of GET with a query parameter
    #[arg(long, global = true)]
    pub post: bool,

    /// Start with the webhook disabled (local responder only)
    #[arg(long, global = true)]
    pub no_webhook: bool,

    /// Start with debug mode on
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Append the session transcript to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Write diagnostic logs here instead of the default data directory
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message (or /command) without the TUI and print the result
    Say {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        text: Vec<String>,
    },
    /// Set a configuration value in the config file
    Set {
        /// Configuration key, e.g. webhook.url or features.debugging
        key: String,
        /// New value
        value: String,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to reset
        key: String,
    },
    /// Show the config file location and the effective settings
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    if let Err(err) = runtime.block_on(async_main(args)) {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.clone().unwrap_or(Commands::Chat);

    match command {
        Commands::Set { key, value } => {
            let path = config_file(&args)?;
            let mut config = Config::load_from_path(&path)?;
            config.set_value(&key, &value)?;
            config.save_to_path(&path)?;
            println!("✅ Set {key} = {value} in {}", path_display(&path));
            Ok(())
        }
        Commands::Unset { key } => {
            let path = config_file(&args)?;
            let mut config = Config::load_from_path(&path)?;
            config.unset_value(&key)?;
            config.save_to_path(&path)?;
            println!("✅ Unset {key} in {}", path_display(&path));
            Ok(())
        }
        Commands::Config => {
            let path = config_file(&args)?;
            let config = effective_config(&args)?;
            println!("Config file: {}", path_display(&path));
            if std::env::var(WEBHOOK_URL_ENV).is_ok_and(|url| !url.trim().is_empty()) {
                println!("({WEBHOOK_URL_ENV} overrides webhook.url)");
            }
            for line in config.describe() {
                println!("  {line}");
            }
            Ok(())
        }
        Commands::Say { text } => {
            init_tracing(TraceTarget::Stderr);
            let config = effective_config(&args)?;
            let client = Arc::new(WebhookClient::new(&config.webhook)?);
            let log = LoggingState::new(args.log.clone())?;
            run_say(text.join(" "), &config, log, client).await
        }
        Commands::Chat => {
            let trace_path = match &args.trace_file {
                Some(path) => Some(path.clone()),
                None => default_trace_path(),
            };
            init_tracing(match trace_path {
                Some(path) => TraceTarget::File(path),
                None => TraceTarget::Discard,
            });
            if !std::io::stdout().is_terminal() {
                return Err(
                    "the chat interface needs a terminal; use `matrix-terminal say` for scripts"
                        .into(),
                );
            }

            let config = effective_config(&args)?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                environment = %config.environment(),
                webhook = config.webhook_url().unwrap_or("<unset>"),
                "starting chat session"
            );
            let client = Arc::new(WebhookClient::new(&config.webhook)?);
            tracing::debug!(method = client.method().as_str(), "webhook client ready");
            let log = LoggingState::new(args.log.clone())?;
            tracing::debug!(transcript_log = %log.get_status_string(), "transcript log ready");
            run_chat(config, log, client).await
        }
    }
}

fn config_file(args: &Args) -> Result<PathBuf, ConfigError> {
    match &args.config {
        Some(path) => Ok(path.clone()),
        None => Config::config_path(),
    }
}

/// File, then environment, then command-line flags.
pub fn effective_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = Config::load(args.config.as_deref())?;
    apply_cli_overrides(&mut config, args)?;
    Ok(config)
}

pub fn apply_cli_overrides(config: &mut Config, args: &Args) -> Result<(), ConfigError> {
    if let Some(url) = &args.webhook_url {
        config.set_value("webhook.url", url)?;
    }
    if args.post {
        config.webhook.use_post = true;
    }
    if args.no_webhook {
        config.features.webhook_enabled = false;
    }
    if args.debug {
        config.features.debugging = true;
    }
    Ok(())
}

enum TraceTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

fn default_trace_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "matrix-terminal", "matrix-terminal")
        .map(|dirs| dirs.data_dir().join("matrix-terminal.log"))
}

fn open_trace_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    File::options().create(true).append(true).open(path)
}

/// Diagnostic logging. The TUI owns the screen, so interactive sessions log to
/// a file; `say` logs to stderr.
fn init_tracing(target: TraceTarget) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.trim().is_empty() => {
            EnvFilter::new(format!("{filter}{NOISY_CRATE_FILTERS}"))
        }
        _ => EnvFilter::new(format!("warn,matrix_terminal=info{NOISY_CRATE_FILTERS}")),
    };

    match target {
        TraceTarget::Stderr => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .ok();
        }
        TraceTarget::File(path) => match open_trace_file(&path) {
            Ok(file) => {
                let fmt_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .try_init()
                    .ok();
            }
            Err(err) => {
                eprintln!("⚠️  Could not open log file {}: {err}", path_display(&path));
            }
        },
        TraceTarget::Discard => {}
    }
}
