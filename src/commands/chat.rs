//! Interactive chat mode handler.
//!
//! Runs a readline-based loop: plain lines are sent to the active chat and
//! the loop waits for the reply before reading again, which is what keeps
//! a second send from being issued mid-exchange.

use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use super::{chat_table, exchange, render_chat, resolve_chat_id, short_id, AppContext};
use crate::error::{MetiorError, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `ctx` - Opened application context
/// * `chat` - Optional chat id (or prefix) to open first
pub async fn run_chat(ctx: &AppContext, chat: Option<String>) -> Result<()> {
    let requested = match chat.as_deref() {
        Some(input) => resolve_chat_id(&ctx.sessions.chats(), input)?,
        None => None,
    };
    ctx.sessions.select_or_default(requested.as_deref());

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(ctx);

    loop {
        match rl.readline(&prompt(ctx)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };

                if command == SpecialCommand::Exit {
                    break;
                }

                rl.add_history_entry(trimmed)?;

                if let Err(e) = handle_command(ctx, command, &line).await {
                    match e.downcast_ref::<MetiorError>() {
                        Some(MetiorError::Storage(_)) => return Err(e),
                        _ => eprintln!("{}", e.to_string().red()),
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                return Err(err.into());
            }
        }
    }

    if let Some(chat_id) = ctx.sessions.cancel_pending() {
        tracing::debug!(chat_id = %chat_id, "Dropped pending reply on exit");
    }
    println!("Goodbye!");
    Ok(())
}

async fn handle_command(ctx: &AppContext, command: SpecialCommand, line: &str) -> Result<()> {
    match command {
        SpecialCommand::NewChat => {
            let chat = ctx.sessions.create_chat()?;
            println!("{}", format!("Created new chat {}", short_id(&chat.id)).green());
        }
        SpecialCommand::ListChats => {
            let chats = ctx.sessions.chats();
            if chats.is_empty() {
                println!("{}", "No chats yet.".yellow());
            } else {
                let active = ctx.sessions.active_chat();
                chat_table(&chats, active.as_ref().map(|c| c.id.as_str())).printstd();
            }
        }
        SpecialCommand::SelectChat(input) => {
            let id = resolve_chat_id(&ctx.sessions.chats(), &input)?
                .ok_or_else(|| MetiorError::ChatNotFound(input.clone()))?;
            let chat = ctx.sessions.select(&id)?;
            print!("{}", render_chat(&chat));
        }
        SpecialCommand::DeleteChat(input) => {
            let id = resolve_chat_id(&ctx.sessions.chats(), &input)?.unwrap_or(input);
            ctx.sessions.delete_chat(&id)?;
            println!("{}", format!("Deleted chat {}", short_id(&id)).green());
        }
        SpecialCommand::ShowChat => match ctx.sessions.active_chat() {
            Some(chat) => print!("{}", render_chat(&chat)),
            None => println!("{}", "No active chat; type a message to start one.".yellow()),
        },
        SpecialCommand::Help => print_help(),
        SpecialCommand::Exit => {}
        SpecialCommand::None => exchange(&ctx.sessions, line).await?,
    }
    Ok(())
}

fn prompt(ctx: &AppContext) -> String {
    match ctx.sessions.active_chat() {
        Some(chat) => format!("[{}] >> ", truncate_title(&chat.title, 20)),
        None => "[new] >> ".to_string(),
    }
}

fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() > max {
        format!("{}...", title.chars().take(max).collect::<String>())
    } else {
        title.to_string()
    }
}

fn print_welcome_banner(ctx: &AppContext) {
    println!("{}", "Metior interactive chat".bold());
    println!("Type /help for commands, /exit to leave.\n");
    if let Some(chat) = ctx.sessions.active_chat() {
        print!("{}", render_chat(&chat));
    }
}
