mod registry;
pub mod probes;

pub use probes::ProbeKind;
pub use registry::{all_commands, find_command, Command};

use crate::core::config::Environment;
use crate::core::render::RenderEvent;
use crate::core::session::FeatureFlags;
use crate::utils::random::choose;
use chrono::Local;

pub const MATRIX_QUOTES: &[&str] = &[
    "There is no spoon.",
    "Follow the white rabbit.",
    "Welcome to the real world.",
    "The Matrix has you...",
    "Free your mind.",
    "What is real? How do you define 'real'?",
    "I can only show you the door. You're the one that has to walk through it.",
    "The body cannot live without the mind.",
    "There's a difference between knowing the path and walking the path.",
    "Choice. The problem is choice.",
    "We're not here because we're free. We're here because we're not free.",
    "The Matrix is everywhere. It is all around us.",
];

/// The slice of session state commands may read or toggle.
pub struct CommandContext<'a> {
    pub flags: &'a mut FeatureFlags,
    pub environment: Environment,
    pub user_name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Not a command; send it to the response engine.
    ProcessAsMessage(String),
    Handled(Vec<RenderEvent>),
    /// Unrecognised command. The events include the error cue.
    Rejected(Vec<RenderEvent>),
    Probe(ProbeKind),
}

pub fn process_input(ctx: &mut CommandContext<'_>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(name) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(trimmed.to_string());
    };

    match registry::find_command(name) {
        Some(command) => (command.handler)(ctx),
        None => {
            tracing::debug!(input = trimmed, "unknown command");
            CommandResult::Rejected(vec![
                RenderEvent::system(format!(
                    "Unknown command: {trimmed}. Type /help for available commands."
                )),
                RenderEvent::ErrorCue,
            ])
        }
    }
}

pub fn help_text() -> String {
    let mut help = String::from("Available commands:");
    for command in all_commands() {
        help.push_str(&format!("\n/{} - {}", command.name, command.help));
    }
    help
}

fn system(text: impl Into<String>) -> CommandResult {
    CommandResult::Handled(vec![RenderEvent::system(text)])
}

fn toggled(label: &str, enabled: bool) -> CommandResult {
    system(format!(
        "{label} {}.",
        if enabled { "enabled" } else { "disabled" }
    ))
}

pub(super) fn handle_help(_ctx: &mut CommandContext<'_>) -> CommandResult {
    system(help_text())
}

pub(super) fn handle_clear(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::Handled(vec![
        RenderEvent::TranscriptCleared,
        RenderEvent::system("Terminal cleared."),
    ])
}

pub(super) fn handle_matrix(_ctx: &mut CommandContext<'_>) -> CommandResult {
    let quote = choose(MATRIX_QUOTES).copied().unwrap_or(MATRIX_QUOTES[0]);
    CommandResult::Handled(vec![RenderEvent::bot(quote)])
}

pub(super) fn handle_time(_ctx: &mut CommandContext<'_>) -> CommandResult {
    system(format!(
        "Current time: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ))
}

pub(super) fn handle_status(ctx: &mut CommandContext<'_>) -> CommandResult {
    let webhook = if ctx.flags.webhook_enabled {
        "ENABLED"
    } else {
        "DISABLED"
    };
    system(format!(
        "MATRIX TERMINAL v{}\nStatus: ONLINE\nEnvironment: {}\nWebhook: {webhook}\nConnection: SECURED\nAI Assistant: READY",
        env!("CARGO_PKG_VERSION"),
        ctx.environment.label(),
    ))
}

pub(super) fn handle_whoami(ctx: &mut CommandContext<'_>) -> CommandResult {
    system(format!(
        "User: {}\nAccess Level: Administrator\nLocation: The Matrix",
        ctx.user_name
    ))
}

pub(super) fn handle_sound(ctx: &mut CommandContext<'_>) -> CommandResult {
    ctx.flags.sound_enabled = !ctx.flags.sound_enabled;
    toggled("Sound effects", ctx.flags.sound_enabled)
}

pub(super) fn handle_webhook(ctx: &mut CommandContext<'_>) -> CommandResult {
    ctx.flags.webhook_enabled = !ctx.flags.webhook_enabled;
    toggled("Webhook integration", ctx.flags.webhook_enabled)
}

pub(super) fn handle_debug(ctx: &mut CommandContext<'_>) -> CommandResult {
    ctx.flags.debug = !ctx.flags.debug;
    toggled("Debug mode", ctx.flags.debug)
}

pub(super) fn handle_connection(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::Probe(ProbeKind::Connection)
}

pub(super) fn handle_testpost(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::Probe(ProbeKind::TestPost)
}

pub(super) fn handle_testsimple(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::Probe(ProbeKind::TestSimple)
}

pub(super) fn handle_testecho(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::Probe(ProbeKind::TestEcho)
}
