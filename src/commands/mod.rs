mod registry;

pub use registry::{all_commands, matching_commands, CommandInvocation};

use crate::core::app::App;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
}

/// Runs `input` as a slash command, or hands it back for sending. A leading
/// `//` escapes the slash so the rest is sent as-is.
pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if let Some(escaped) = trimmed.strip_prefix("//") {
        return CommandResult::ProcessAsMessage(format!("/{escaped}"));
    }
    let Some(body) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = body.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation { args };
        (command.handler)(app, invocation)
    } else {
        let hint = matching_commands(command_name)
            .first()
            .map(|command| format!(" (did you mean {}?)", command.usage))
            .unwrap_or_default();
        app.post_error(format!("Unknown command: /{command_name}{hint}"));
        CommandResult::Continue
    }
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<22} {}", command.usage, command.help));
    }
    app.post_info(help);
    CommandResult::Continue
}

pub(super) fn handle_add_user(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() || invocation.args.split_whitespace().count() > 1 {
        app.post_error("Usage: /add-user <username>");
        return CommandResult::Continue;
    }
    app.add_user_to_current_channel(invocation.args);
    CommandResult::Continue
}

pub(super) fn handle_multiline(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.session.toggle_multiline();
    let state = if app.session.is_multiline() { "on" } else { "off" };
    app.post_info(format!("Multi-line editing {state}"));
    CommandResult::Continue
}

pub(super) fn handle_preview(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.session.toggle_message_preview();
    CommandResult::Continue
}

pub(super) fn handle_quit(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.exit_requested = true;
    CommandResult::Continue
}
