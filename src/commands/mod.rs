/*!
Command handlers for the CLI

Each handler opens nothing itself: `AppContext::open` wires the configured
storage backend into a `SessionStore` and an `AccountStore`, and the
handlers print results the way a terminal user expects to read them.
*/

use crate::account::{AccountStore, RegistrationForm};
use crate::config::Config;
use crate::error::{MetiorError, Result};
use crate::responder::CannedResponder;
use crate::session::{Chat, ReplyOutcome, Role, SendOutcome, SessionStore};
use crate::storage::{open_store, SnapshotRepository};
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

// Interactive chat loop
pub mod chat;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Everything a command needs, built from configuration
pub struct AppContext {
    /// Chat sessions
    pub sessions: SessionStore,
    /// Local account stub
    pub accounts: AccountStore,
}

impl AppContext {
    /// Open storage and load the persisted chats
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened or the snapshot
    /// cannot be parsed
    pub fn open(config: &Config) -> Result<Self> {
        let kv = open_store(&config.storage)?;
        let repository = Arc::new(SnapshotRepository::new(
            kv.clone(),
            config.storage.chats_key.clone(),
        ));
        let responder = Arc::new(CannedResponder::from_config(&config.responder));
        let sessions = SessionStore::new(repository, responder, config.session.clone());
        sessions.load_all()?;

        let accounts = AccountStore::new(kv, config.storage.user_key.clone());
        Ok(Self { sessions, accounts })
    }
}

/// Resolve a full chat id or a unique prefix of one
///
/// Returns `None` when nothing matches. Blank input never matches.
///
/// # Errors
///
/// Returns `MetiorError::Validation` when the prefix matches several chats
pub fn resolve_chat_id(chats: &[Chat], input: &str) -> Result<Option<String>> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    if chats.iter().any(|c| c.id == input) {
        return Ok(Some(input.to_string()));
    }

    let matches: Vec<&Chat> = chats.iter().filter(|c| c.id.starts_with(input)).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [chat] => Ok(Some(chat.id.clone())),
        _ => Err(MetiorError::Validation(format!(
            "Chat id prefix '{}' matches {} chats",
            input,
            matches.len()
        ))
        .into()),
    }
}

/// Shorten an id for display
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Build the chat listing table
pub fn chat_table(chats: &[Chat], active_id: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for chat in chats {
        let marker = if Some(chat.id.as_str()) == active_id {
            "*"
        } else {
            " "
        };
        let title = if chat.title.chars().count() > 40 {
            format!("{}...", chat.title.chars().take(37).collect::<String>())
        } else {
            chat.title.clone()
        };
        let updated = chat.last_updated.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            format!("{}{}", marker, short_id(&chat.id)).cyan(),
            title,
            chat.len(),
            updated
        ]);
    }

    table
}

/// Render one chat as plain lines, oldest message first
pub fn render_chat(chat: &Chat) -> String {
    let mut out = format!("{} ({})\n", chat.title, short_id(&chat.id));
    if chat.is_empty() {
        out.push_str("  (no messages yet)\n");
    }
    for message in &chat.messages {
        let time = message.timestamp.format("%H:%M");
        out.push_str(&format!("  [{}] {}: {}\n", time, message.role, message.content));
    }
    out
}

fn print_message(role: Role, content: &str) {
    match role {
        Role::User => println!("{} {}", "you:".green().bold(), content),
        Role::Assistant => println!("{} {}", "assistant:".cyan().bold(), content),
    }
}

/// Create a new empty chat
pub fn new_chat(ctx: &AppContext) -> Result<()> {
    let chat = ctx.sessions.create_chat()?;
    println!("{}", format!("Created new chat {}", chat.id).green());
    Ok(())
}

/// List all chats
pub fn list_chats(ctx: &AppContext) -> Result<()> {
    let chats = ctx.sessions.chats();
    if chats.is_empty() {
        println!("{}", "No chats yet.".yellow());
        return Ok(());
    }

    let active = ctx.sessions.active_chat();
    println!("\nChats:");
    chat_table(&chats, active.as_ref().map(|c| c.id.as_str())).printstd();
    println!();
    Ok(())
}

/// Print a chat (the front chat when no id is given)
pub fn show_chat(ctx: &AppContext, id: Option<String>) -> Result<()> {
    let resolved = match id.as_deref() {
        Some(input) => Some(
            resolve_chat_id(&ctx.sessions.chats(), input)?
                .ok_or_else(|| MetiorError::ChatNotFound(input.to_string()))?,
        ),
        None => None,
    };

    match ctx.sessions.select_or_default(resolved.as_deref()) {
        Some(chat) => print!("{}", render_chat(&chat)),
        None => println!("{}", "No chats yet.".yellow()),
    }
    Ok(())
}

/// Send a single message and wait for its reply
///
/// Without `chat` the message goes to the front chat, or starts a new one
/// when there are no chats yet.
pub async fn send(ctx: &AppContext, chat: Option<String>, text: String) -> Result<()> {
    match chat {
        Some(input) => {
            let id = resolve_chat_id(&ctx.sessions.chats(), &input)?
                .ok_or_else(|| MetiorError::ChatNotFound(input.clone()))?;
            ctx.sessions.select(&id)?;
        }
        None => {
            ctx.sessions.select_or_default(None);
        }
    }

    exchange(&ctx.sessions, &text).await
}

/// Run one send/reply exchange against the active chat, printing both turns
pub(crate) async fn exchange(sessions: &SessionStore, text: &str) -> Result<()> {
    let pending = match sessions.send_message(text)? {
        SendOutcome::Ignored => {
            println!("{}", "Enter a message".yellow());
            return Ok(());
        }
        SendOutcome::Pending(pending) => pending,
    };

    print_message(Role::User, text);
    println!("{}", "...".dimmed());

    match pending.wait().await? {
        ReplyOutcome::Delivered(chat) => {
            if let Some(reply) = chat.messages.last() {
                print_message(reply.role, &reply.content);
            }
        }
        ReplyOutcome::Cancelled => println!("{}", "Reply cancelled".yellow()),
        ReplyOutcome::Discarded => println!("{}", "Chat no longer exists; reply dropped".yellow()),
    }
    Ok(())
}

/// Delete a chat
pub fn delete_chat(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_chat_id(&ctx.sessions.chats(), id)?.unwrap_or_else(|| id.to_string());
    ctx.sessions.delete_chat(&id)?;
    println!("{}", format!("Deleted chat {}", id).green());
    Ok(())
}

/// Register the local user
pub fn register(ctx: &AppContext, form: RegistrationForm) -> Result<()> {
    let user = ctx.accounts.register(&form)?;
    println!(
        "{}",
        format!("Registration successful. Welcome, {}!", user.name).green()
    );
    Ok(())
}

/// Show the registered user
pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.accounts.current_user()? {
        Some(user) if user.logged => println!("{} <{}>", user.name.bold(), user.email),
        _ => println!("{}", "Not registered.".yellow()),
    }
    Ok(())
}

/// Wipe every chat and the user record
pub fn clear(ctx: &AppContext, yes: bool) -> Result<()> {
    if !yes {
        return Err(MetiorError::Validation(
            "Refusing to clear all data without --yes".to_string(),
        )
        .into());
    }

    ctx.accounts.clear_all_data()?;
    ctx.sessions.load_all()?;
    ctx.sessions.select_or_default(None);
    println!("{}", "All chats and account data cleared".green());
    Ok(())
}
