//! Special commands parser for interactive chat mode
//!
//! Commands are prefixed with `/` and are case-insensitive; chat ids given
//! as arguments keep their original case. Anything else is a message.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start an empty chat and switch to it
    NewChat,

    /// List all chats
    ListChats,

    /// Switch to the chat with this id
    SelectChat(String),

    /// Delete the chat with this id
    DeleteChat(String),

    /// Reprint the active chat
    ShowChat,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message
    None,
}

/// Parse a line of input into a special command
///
/// # Examples
///
/// ```
/// use metior::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((c, a)) => (c.to_lowercase(), a.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),
        "/list" | "/chats" => Ok(SpecialCommand::ListChats),
        "/show" => Ok(SpecialCommand::ShowChat),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        "/select" | "/open" => require_arg(&command, arg, "/select <ID>")
            .map(|id| SpecialCommand::SelectChat(id.to_string())),
        "/delete" | "/rm" => require_arg(&command, arg, "/delete <ID>")
            .map(|id| SpecialCommand::DeleteChat(id.to_string())),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn require_arg<'a>(command: &str, arg: &'a str, usage: &str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg)
    }
}

/// Print the interactive help text
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CHATS:
  /new            - Start a new empty chat
  /list           - List all chats (most recent first)
  /select <ID>    - Switch to a chat (full id or unique prefix)
  /delete <ID>    - Delete a chat
  /show           - Reprint the active chat

OTHER:
  /help           - Show this help
  /exit           - Leave interactive mode (also: exit, quit)

Anything else is sent as a message to the active chat. With no active
chat, the first message starts a new one titled after it.
"#
    );
}
