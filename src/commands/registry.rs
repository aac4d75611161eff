use super::{CommandContext, CommandResult};

pub type CommandHandler = fn(&mut CommandContext<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

/// Exact, case-insensitive lookup of the whole command word (no leading `/`).
pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        help: "Show this help message",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        help: "Clear the terminal",
        handler: super::handle_clear,
    },
    Command {
        name: "matrix",
        help: "Display Matrix quote",
        handler: super::handle_matrix,
    },
    Command {
        name: "time",
        help: "Show current time",
        handler: super::handle_time,
    },
    Command {
        name: "status",
        help: "System status",
        handler: super::handle_status,
    },
    Command {
        name: "whoami",
        help: "Display user info",
        handler: super::handle_whoami,
    },
    Command {
        name: "sound",
        help: "Toggle sound effects",
        handler: super::handle_sound,
    },
    Command {
        name: "webhook",
        help: "Toggle webhook integration",
        handler: super::handle_webhook,
    },
    Command {
        name: "debug",
        help: "Toggle debug mode",
        handler: super::handle_debug,
    },
    Command {
        name: "connection",
        help: "Test webhook connection",
        handler: super::handle_connection,
    },
    Command {
        name: "testpost",
        help: "Test the webhook with a POST request",
        handler: super::handle_testpost,
    },
    Command {
        name: "testsimple",
        help: "Test the webhook with a bare GET (no parameters)",
        handler: super::handle_testsimple,
    },
    Command {
        name: "testecho",
        help: "Ask the webhook to echo a fixed message",
        handler: super::handle_testecho,
    },
];
