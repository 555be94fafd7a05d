//! Persistence interface consumed by the Telegram layer. Implementations own the schema and
//! consistency of chats, buttons and users; see `tgbot-storage` for reference backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Button, ChatInfo, User};

/// Storage for per-chat conversation state, stored buttons and known users.
///
/// Lookups return [`TgBotError::NotFound`](crate::TgBotError::NotFound) for missing rows and
/// [`TgBotError::Storage`](crate::TgBotError::Storage) for backend failures.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo>;
    /// Inserts or replaces the chat row.
    async fn save_chat_info(&self, chat: &ChatInfo) -> Result<()>;
    async fn get_button(&self, button_id: &str) -> Result<Button>;
    async fn save_button(&self, button: &Button) -> Result<()>;
    /// Inserts or updates the user row.
    async fn save_user(&self, user: &User) -> Result<()>;
}
