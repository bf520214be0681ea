//! Command-line interface definition for Metior
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for managing chats, exchanging messages, and the
//! local account stub.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Metior - local chat sessions with a canned assistant
///
/// Chats and messages are kept in a single JSON snapshot inside an
/// embedded key-value store.
#[derive(Parser, Debug, Clone)]
#[command(name = "metior")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the database location
    #[arg(long, env = "METIOR_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Metior
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new empty chat and make it active
    New,

    /// List stored chats, most recent first
    List,

    /// Print the messages of a chat (defaults to the front chat)
    Show {
        /// Chat identifier
        id: Option<String>,
    },

    /// Send one message and wait for the reply
    Send {
        /// Chat to send to; defaults to the most recent chat, or a new one if none exist
        #[arg(long)]
        chat: Option<String>,

        /// Message text
        text: String,
    },

    /// Delete a chat
    Delete {
        /// Chat identifier
        id: String,
    },

    /// Start an interactive chat session
    Chat {
        /// Chat to open; defaults to the most recent one
        #[arg(long)]
        chat: Option<String>,
    },

    /// Register the local user
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        confirm_password: String,

        /// Accept the terms of use
        #[arg(long)]
        accept_terms: bool,
    },

    /// Show the registered user
    Whoami,

    /// Remove all chats and the user record
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
