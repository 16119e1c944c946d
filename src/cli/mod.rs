//! CLI commands for leadpilot using clap.

use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config;
use crate::copilot::{MemoryWriter, OpenRouterProvider};
use crate::error::Result;
use crate::sheets::SheetsClient;
use crate::store::Store;
use crate::telegram::TelegramSender;
use crate::web::{self, auth, AppState, WebServerConfig};

/// Leadpilot - small business CRM with an AI copilot.
#[derive(Parser)]
#[command(name = "leadpilot")]
#[command(version = "0.1.0")]
#[command(about = "Leadpilot - CRM pipeline, copilot, and Telegram gateway", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides settings)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Pull leads from the external source into the store
    Sync {
        /// User id that will own inserted leads
        #[arg(long)]
        user: String,
    },

    /// Write a starter settings file
    Setup,

    /// Issue a bearer token for a user id
    Token {
        /// User id to embed in the token
        user: String,
    },

    /// Link a Telegram chat id to a user id
    LinkTelegram {
        /// Telegram chat id (group chats are negative)
        #[arg(allow_negative_numbers = true)]
        chat_id: i64,
        /// User id to bind it to
        user: String,
    },
}

impl Commands {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Serve { port } => {
                let settings = config::load_settings_or_default();
                let store = Store::open(settings.db_path()?)?;
                let memory = MemoryWriter::spawn(store.clone());
                let state = AppState {
                    provider: Arc::new(OpenRouterProvider::from_settings(&settings)),
                    sender: TelegramSender::from_settings(&settings),
                    sheets: SheetsClient::from_settings(&settings),
                    jwt_secret: settings.jwt_secret(),
                    store,
                    memory,
                };
                let server_config = WebServerConfig {
                    port: port.unwrap_or(settings.web.port),
                    host: settings.web.host.clone(),
                };
                web::run_server(state, server_config).await
            }

            Command::Sync { user } => {
                let settings = config::load_settings_or_default();
                let store = Store::open(settings.db_path()?)?;
                let sheets = SheetsClient::from_settings(&settings);
                let incoming = sheets.master_leads().await?;
                let count = store.sync_from_source(&user, &incoming)?;
                println!("Synced {} new leads ({} fetched)", count, incoming.len());
                Ok(())
            }

            Command::Setup => {
                let path = config::write_default_settings()?;
                println!("Wrote starter settings to {}", path.display());
                println!("Fill in channels.telegram.bot_token, models.openrouter.api_key, and sheets.*");
                Ok(())
            }

            Command::Token { user } => {
                let settings = config::load_settings_or_default();
                let token =
                    auth::issue_token(&settings.jwt_secret(), &user, auth::TOKEN_EXPIRATION_SECS)?;
                println!("{}", token);
                Ok(())
            }

            Command::LinkTelegram { chat_id, user } => {
                let settings = config::load_settings_or_default();
                let store = Store::open(settings.db_path()?)?;
                store.link_telegram_user(chat_id, &user)?;
                println!("Linked chat {} to user {}", chat_id, user);
                Ok(())
            }
        }
    }
}
