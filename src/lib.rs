//! Leadpilot library root.

pub mod cli;
pub mod config;
pub mod copilot;
pub mod error;
pub mod logging;
pub mod model;
pub mod sheets;
pub mod store;
pub mod telegram;
pub mod web;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
pub use model::{HeatLevel, Lead, PipelineStatus};
pub use store::Store;
pub use web::run_server;
