//! Metior - local chat sessions with a canned assistant
//!
#![doc = "Main entry point for the Metior CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use metior::account::RegistrationForm;
use metior::cli::{Cli, Commands};
use metior::commands::{self, AppContext};
use metior::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let ctx = AppContext::open(&config)?;

    match cli.command {
        Commands::New => commands::new_chat(&ctx),
        Commands::List => commands::list_chats(&ctx),
        Commands::Show { id } => commands::show_chat(&ctx, id),
        Commands::Send { chat, text } => {
            if let Some(c) = &chat {
                tracing::debug!("Sending to chat: {}", c);
            }
            commands::send(&ctx, chat, text).await
        }
        Commands::Delete { id } => commands::delete_chat(&ctx, &id),
        Commands::Chat { chat } => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(&ctx, chat).await
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
            accept_terms,
        } => commands::register(
            &ctx,
            RegistrationForm {
                name,
                email,
                password,
                confirm_password,
                accepted_terms: accept_terms,
            },
        ),
        Commands::Whoami => commands::whoami(&ctx),
        Commands::Clear { yes } => commands::clear(&ctx, yes),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "metior=debug" } else { "metior=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
