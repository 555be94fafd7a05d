//! Shared fixtures: a recording in-memory [`ChatProvider`] and raw teloxide updates built from JSON.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use teloxide::types::Update as TgUpdate;
use tgbot_core::{Button, ChatInfo, ChatProvider, Result, TgBotError, User};
use tgbot_telegram::Update;

pub const USER_ID: i64 = 42;

/// Provider backed by hash maps. Counts lookups so tests can assert on lazy caching;
/// `failing()` makes every call return a storage error.
#[derive(Default)]
pub struct MockChatProvider {
    chats: Mutex<HashMap<i64, ChatInfo>>,
    buttons: Mutex<HashMap<String, Button>>,
    users: Mutex<HashMap<i64, User>>,
    fail: bool,
    pub chat_lookups: AtomicUsize,
    pub button_lookups: AtomicUsize,
    pub chat_saves: AtomicUsize,
}

impl MockChatProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn with_button(self: Arc<Self>, button: Button) -> Arc<Self> {
        self.buttons
            .lock()
            .unwrap()
            .insert(button.id().to_string(), button);
        self
    }

    pub fn with_chat(self: Arc<Self>, chat: ChatInfo) -> Arc<Self> {
        self.chats.lock().unwrap().insert(chat.chat_id, chat);
        self
    }

    pub fn stored_chat(&self, chat_id: i64) -> Option<ChatInfo> {
        self.chats.lock().unwrap().get(&chat_id).cloned()
    }

    pub fn stored_user(&self, user_id: i64) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub fn stored_button(&self, id: &str) -> Option<Button> {
        self.buttons.lock().unwrap().get(id).cloned()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(TgBotError::Storage("backend unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        self.chat_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.chats
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| TgBotError::NotFound(format!("chat {}", chat_id)))
    }

    async fn save_chat_info(&self, chat: &ChatInfo) -> Result<()> {
        self.chat_saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.chats.lock().unwrap().insert(chat.chat_id, chat.clone());
        Ok(())
    }

    async fn get_button(&self, button_id: &str) -> Result<Button> {
        self.button_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.buttons
            .lock()
            .unwrap()
            .get(button_id)
            .cloned()
            .ok_or_else(|| TgBotError::NotFound(format!("button {}", button_id)))
    }

    async fn save_button(&self, button: &Button) -> Result<()> {
        self.check()?;
        self.buttons
            .lock()
            .unwrap()
            .entry(button.id().to_string())
            .or_insert_with(|| button.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.check()?;
        self.users.lock().unwrap().insert(user.user_id, user.clone());
        Ok(())
    }
}

pub fn from_json(id: i64) -> Value {
    json!({"id": id, "is_bot": false, "first_name": "Ann", "username": "ann"})
}

pub fn private_chat(id: i64) -> Value {
    json!({"id": id, "type": "private", "first_name": "Ann"})
}

pub fn group_chat(id: i64) -> Value {
    json!({"id": id, "type": "group", "title": "Team"})
}

pub fn message_json(message_id: i32, chat: Value, text: &str) -> Value {
    json!({
        "message_id": message_id,
        "date": 1700000000,
        "chat": chat,
        "from": from_json(USER_ID),
        "text": text
    })
}

pub fn message_update(chat: Value, text: &str) -> TgUpdate {
    raw(json!({"update_id": 1, "message": message_json(10, chat, text)}))
}

pub fn edited_message_update(chat: Value, text: &str) -> TgUpdate {
    raw(json!({"update_id": 2, "edited_message": message_json(11, chat, text)}))
}

pub fn callback_update(data: &str, chat: Value) -> TgUpdate {
    raw(json!({
        "update_id": 3,
        "callback_query": {
            "id": "cb-1",
            "from": from_json(USER_ID),
            "chat_instance": "instance",
            "data": data,
            "message": message_json(55, chat, "Pick one")
        }
    }))
}

pub fn inline_callback_update(data: &str, inline_message_id: &str) -> TgUpdate {
    raw(json!({
        "update_id": 4,
        "callback_query": {
            "id": "cb-2",
            "from": from_json(USER_ID),
            "chat_instance": "instance",
            "data": data,
            "inline_message_id": inline_message_id
        }
    }))
}

pub fn inline_query_update(query: &str, chat_type: Option<&str>) -> TgUpdate {
    let mut inline = json!({
        "id": "iq-1",
        "from": from_json(USER_ID),
        "query": query,
        "offset": ""
    });
    if let Some(chat_type) = chat_type {
        inline["chat_type"] = json!(chat_type);
    }
    raw(json!({"update_id": 5, "inline_query": inline}))
}

pub fn my_chat_member_update(chat: Value) -> TgUpdate {
    raw(json!({
        "update_id": 6,
        "my_chat_member": {
            "chat": chat,
            "from": from_json(USER_ID),
            "date": 1700000000,
            "old_chat_member": {"status": "left", "user": from_json(999)},
            "new_chat_member": {"status": "member", "user": from_json(999)}
        }
    }))
}

pub fn channel_post_update() -> TgUpdate {
    raw(json!({
        "update_id": 7,
        "channel_post": {
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": -1001, "type": "channel", "title": "News"},
            "text": "hello"
        }
    }))
}

/// Parses from text: teloxide's `Update` deserializer does not accept a `serde_json::Value`
/// input and falls back to `UpdateKind::Error`.
pub fn raw(value: Value) -> TgUpdate {
    serde_json::from_str(&value.to_string()).expect("valid update JSON")
}

pub fn test_user() -> User {
    User {
        user_id: USER_ID,
        display_name: "Ann".to_string(),
        last_name: None,
        phone: None,
        user_name: Some("ann".to_string()),
    }
}

pub fn wrap(raw: TgUpdate, provider: Arc<MockChatProvider>) -> Update {
    Update::new(raw, test_user(), provider)
}
