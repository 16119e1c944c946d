//! Error types for leadpilot.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Db(String),

    #[error("Lead source error: {0}")]
    Sheets(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Web error: {0}")]
    Web(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}
