//! In-memory [`ChatProvider`]: nothing survives a restart. Used by tests and the demo when no
//! database is configured.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tgbot_core::{Button, ChatInfo, ChatProvider, Result, TgBotError, User};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct InMemoryChatProvider {
    chats: RwLock<HashMap<i64, ChatInfo>>,
    buttons: RwLock<HashMap<String, Button>>,
    users: RwLock<HashMap<i64, User>>,
    user_saves: AtomicUsize,
}

impl InMemoryChatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_user(&self, user_id: i64) -> Option<User> {
        self.users.read().await.get(&user_id).cloned()
    }

    /// Distinct users seen so far.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Number of `save_user` calls, one per wrapped update.
    pub fn user_saves(&self) -> usize {
        self.user_saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatProvider for InMemoryChatProvider {
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        self.chats
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| TgBotError::NotFound(format!("chat {}", chat_id)))
    }

    async fn save_chat_info(&self, chat: &ChatInfo) -> Result<()> {
        debug!(chat_id = chat.chat_id, chain = %chat.active_chain, "Saving chat info");
        self.chats.write().await.insert(chat.chat_id, chat.clone());
        Ok(())
    }

    async fn get_button(&self, button_id: &str) -> Result<Button> {
        self.buttons
            .read()
            .await
            .get(button_id)
            .cloned()
            .ok_or_else(|| TgBotError::NotFound(format!("button {}", button_id)))
    }

    async fn save_button(&self, button: &Button) -> Result<()> {
        self.buttons
            .write()
            .await
            .entry(button.id().to_string())
            .or_insert_with(|| button.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.user_saves.fetch_add(1, Ordering::Relaxed);
        let mut users = self.users.write().await;
        let phone = user
            .phone
            .clone()
            .or_else(|| users.get(&user.user_id).and_then(|u| u.phone.clone()));
        users.insert(
            user.user_id,
            User {
                phone,
                ..user.clone()
            },
        );
        Ok(())
    }
}
