use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Telegram credentials. Either field may be omitted from the file and
/// supplied through the `BOT_TOKEN` / `CHAT_ID` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Polling interval in seconds for fill and order detection.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Path of the tracked-wallet list file.
    #[serde(default = "default_wallet_file")]
    pub wallet_file: String,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_wallet_file() -> String {
    "wallet_store.json".to_string()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            wallet_file: default_wallet_file(),
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path. A missing file yields
    /// the defaults so the bot can run on environment variables alone.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Resolved bot token: file value first, then the environment.
    pub fn bot_token(&self) -> Result<String> {
        self.telegram
            .bot_token
            .clone()
            .or_else(|| std::env::var("BOT_TOKEN").ok())
            .context("bot token missing: set [telegram].bot_token or the BOT_TOKEN env var")
    }

    /// Resolved notification chat id: file value first, then the environment.
    pub fn chat_id(&self) -> Result<String> {
        self.telegram
            .chat_id
            .clone()
            .or_else(|| std::env::var("CHAT_ID").ok())
            .context("chat id missing: set [telegram].chat_id or the CHAT_ID env var")
    }
}
