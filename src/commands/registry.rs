use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    /// Everything after the command name, trimmed.
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for help and hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "List the available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "add-user",
        usage: "/add-user <username>",
        help: "Add a user to the current channel.",
        handler: super::handle_add_user,
    },
    Command {
        name: "multiline",
        usage: "/multiline",
        help: "Toggle multi-line editing.",
        handler: super::handle_multiline,
    },
    Command {
        name: "preview",
        usage: "/preview",
        help: "Toggle the message preview pane.",
        handler: super::handle_preview,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Exit the client.",
        handler: super::handle_quit,
    },
];
