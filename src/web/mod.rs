//! HTTP API layer.

pub mod api;
pub mod auth;
pub mod router;
pub mod server;

use std::sync::Arc;

use crate::copilot::{CompletionProvider, MemoryWriter};
use crate::sheets::SheetsClient;
use crate::store::Store;
use crate::telegram::TelegramSender;

pub use server::{run_server, WebServerConfig};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub provider: Arc<dyn CompletionProvider>,
    pub sender: TelegramSender,
    pub sheets: SheetsClient,
    pub memory: MemoryWriter,
    pub jwt_secret: String,
}
