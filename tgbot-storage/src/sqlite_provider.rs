//! SQLite-backed [`ChatProvider`].
//!
//! Chain data and button data are stored as JSON text and read back through [`Data::decode`],
//! so a corrupted payload surfaces as a decode error to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tgbot_core::{Button, ChatInfo, ChatProvider, Data, Result, TgBotError, User};
use tracing::{debug, info, instrument};

use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteChatProvider {
    pool_manager: SqlitePoolManager,
}

fn storage_err(e: sqlx::Error) -> TgBotError {
    TgBotError::Storage(e.to_string())
}

fn encode(data: &Data) -> Result<String> {
    serde_json::to_string(data).map_err(|e| TgBotError::Storage(format!("encode data: {}", e)))
}

impl SqliteChatProvider {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool_manager = SqlitePoolManager::new(database_url)
            .await
            .map_err(storage_err)?;
        let provider = Self { pool_manager };
        provider.init().await.map_err(storage_err)?;
        Ok(provider)
    }

    async fn init(&self) -> std::result::Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                chat_id INTEGER PRIMARY KEY,
                active_chain TEXT NOT NULL DEFAULT '',
                active_chain_step TEXT NOT NULL DEFAULT '',
                chain_data TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS buttons (
                id TEXT PRIMARY KEY,
                action TEXT NOT NULL,
                data TEXT NOT NULL DEFAULT '{}',
                created_date TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                last_name TEXT,
                phone TEXT,
                user_name TEXT,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }

    /// Reads back a saved user; used by the demo's `/me` command and tests.
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        let row: Option<(i64, String, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT user_id, display_name, last_name, phone, user_name FROM users WHERE user_id = ?",
            )
            .bind(user_id)
            .fetch_optional(self.pool_manager.pool())
            .await
            .map_err(storage_err)?;

        let (user_id, display_name, last_name, phone, user_name) =
            row.ok_or_else(|| TgBotError::NotFound(format!("user {}", user_id)))?;
        Ok(User {
            user_id,
            display_name,
            last_name,
            phone,
            user_name,
        })
    }

    pub async fn count_users(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool_manager.pool())
            .await
            .map_err(storage_err)?;
        Ok(count)
    }
}

#[async_trait]
impl ChatProvider for SqliteChatProvider {
    #[instrument(skip(self))]
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT chat_id, active_chain, active_chain_step, chain_data FROM chats WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(storage_err)?;

        let (chat_id, active_chain, active_chain_step, chain_data) =
            row.ok_or_else(|| TgBotError::NotFound(format!("chat {}", chat_id)))?;
        Ok(ChatInfo {
            chat_id,
            active_chain,
            active_chain_step,
            chain_data: Data::decode(chain_data.as_bytes())?,
        })
    }

    #[instrument(skip(self, chat), fields(chat_id = chat.chat_id))]
    async fn save_chat_info(&self, chat: &ChatInfo) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chats (chat_id, active_chain, active_chain_step, chain_data)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET
                active_chain = excluded.active_chain,
                active_chain_step = excluded.active_chain_step,
                chain_data = excluded.chain_data
            "#,
        )
        .bind(chat.chat_id)
        .bind(&chat.active_chain)
        .bind(&chat.active_chain_step)
        .bind(encode(&chat.chain_data)?)
        .execute(self.pool_manager.pool())
        .await
        .map_err(storage_err)?;

        debug!(chain = %chat.active_chain, step = %chat.active_chain_step, "Saved chat info");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_button(&self, button_id: &str) -> Result<Button> {
        let row: Option<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, action, data, created_date FROM buttons WHERE id = ?",
        )
        .bind(button_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(storage_err)?;

        let (id, action, data, created_date) =
            row.ok_or_else(|| TgBotError::NotFound(format!("button {}", button_id)))?;
        Ok(Button::from_parts(
            id,
            action,
            Data::decode(data.as_bytes())?,
            created_date,
        ))
    }

    /// Insert only: a button id that already exists keeps its original action and data.
    #[instrument(skip(self, button), fields(button_id = %button.id()))]
    async fn save_button(&self, button: &Button) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO buttons (id, action, data, created_date)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(button.id())
        .bind(button.action())
        .bind(encode(button.data())?)
        .bind(button.created_date())
        .execute(self.pool_manager.pool())
        .await
        .map_err(storage_err)?;

        debug!(action = %button.action(), "Saved button");
        Ok(())
    }

    /// Upsert keyed by user id. A known phone number is kept when the update carries none.
    #[instrument(skip(self, user), fields(user_id = user.user_id))]
    async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, display_name, last_name, phone, user_name, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                last_name = excluded.last_name,
                phone = COALESCE(excluded.phone, users.phone),
                user_name = excluded.user_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user.user_id)
        .bind(&user.display_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.user_name)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: a row whose chain data is not a string map is reported as a decode error.**
    #[tokio::test]
    async fn test_corrupted_chain_data_is_decode_error() {
        let provider = SqliteChatProvider::new("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO chats (chat_id, chain_data) VALUES (?, ?)")
            .bind(7_i64)
            .bind("[1, 2]")
            .execute(provider.pool_manager.pool())
            .await
            .unwrap();

        let result = provider.get_chat_info(7).await;
        assert!(matches!(result, Err(TgBotError::Decode(_))));
    }

    #[tokio::test]
    async fn test_null_chain_data_decodes_empty() {
        let provider = SqliteChatProvider::new("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO chats (chat_id, chain_data) VALUES (?, 'null')")
            .bind(8_i64)
            .execute(provider.pool_manager.pool())
            .await
            .unwrap();

        let chat = provider.get_chat_info(8).await.unwrap();
        assert!(chat.chain_data.is_empty());
        assert!(chat.is_idle());
    }
}
