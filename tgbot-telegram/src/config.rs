//! Minimal framework configuration: token, API URL, log path, storage URL.
//! Loaded from BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE, DATABASE_URL.

use std::env;

use tgbot_core::{Result, TgBotError};

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
    pub database_url: Option<String>,
}

impl TelegramConfig {
    /// BOT_TOKEN is required; everything else is optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = get("BOT_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TgBotError::Config("BOT_TOKEN not set".to_string()))?;
        let telegram_api_url = get("TELEGRAM_API_URL").or_else(|| get("TELOXIDE_API_URL"));
        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file: get("LOG_FILE"),
            database_url: get("DATABASE_URL"),
        })
    }

    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            log_file: None,
            database_url: None,
        }
    }
}
