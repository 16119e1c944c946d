//! Configuration loading for leadpilot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the leadpilot home directory (~/.leadpilot).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".leadpilot"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.leadpilot/settings.json.
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}. Run 'leadpilot setup' first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let mut settings: Settings = serde_json::from_str(&content)?;
    settings.apply_env_overrides();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings or return env-backed defaults if the file is missing.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        let mut settings = Settings::default();
        settings.apply_env_overrides();
        settings
    })
}

/// Write a starter settings file. Refuses to overwrite an existing one.
pub fn write_default_settings() -> Result<PathBuf> {
    let path = get_settings_path()?;
    if path.exists() {
        return Err(Error::Config(format!(
            "Settings file already exists at {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&Settings::default())?;
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Web server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub jwt_secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3333
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: None,
        }
    }
}

/// Database configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// Telegram channel configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
}

/// Channels configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Channels {
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Chat-completion provider configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Models configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Models {
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// External spreadsheet source configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_master_range")]
    pub master_range: String,
    #[serde(default = "default_incoming_range")]
    pub incoming_range: String,
}

fn default_master_range() -> String {
    "CRM_Master!A2:F".to_string()
}

fn default_incoming_range() -> String {
    "Leads!A2:E".to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_key: None,
            master_range: default_master_range(),
            incoming_range: default_incoming_range(),
        }
    }
}

/// Leadpilot settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub channels: Channels,

    #[serde(default)]
    pub models: Models,

    #[serde(default)]
    pub sheets: SheetsConfig,
}

const DEV_JWT_SECRET: &str = "leadpilot-dev-secret-change-in-production";

impl Settings {
    /// Let environment variables take precedence for secrets so deployments
    /// never have to write them to disk.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OPENROUTER_API_KEY") {
            self.models.openrouter.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.channels.telegram.bot_token = Some(v);
        }
        if let Ok(v) = std::env::var("LEADPILOT_JWT_SECRET") {
            self.web.jwt_secret = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_SHEETS_ID") {
            self.sheets.spreadsheet_id = Some(v);
        }
        if let Ok(v) = std::env::var("GOOGLE_SHEETS_API_KEY") {
            self.sheets.api_key = Some(v);
        }
    }

    /// Database path, defaulting to ~/.leadpilot/crm.db.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_home_dir()?.join("crm.db")),
        }
    }

    /// Signing secret for bearer tokens.
    pub fn jwt_secret(&self) -> String {
        match &self.web.jwt_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("No jwt secret configured, using development default");
                DEV_JWT_SECRET.to_string()
            }
        }
    }
}
