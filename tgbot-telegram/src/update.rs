//! Wrapper around one inbound teloxide update.
//!
//! Classification predicates (`is_command`, `is_button`, `is_private`, ...) are independent pure
//! functions of the raw update; callers decide the order in which to check them. The stored
//! button and the chat's conversation state are fetched from the [`ChatProvider`] on first
//! access and cached for the lifetime of the wrapper; chain mutations stay in memory until
//! [`Update::flush_chat_info`].

use std::sync::Arc;

use teloxide::types::{
    CallbackQuery, ChatMemberUpdated, ChatType, InlineQuery, Message, Update as TgUpdate,
    UpdateKind,
};
use tgbot_core::{Button, ChatInfo, ChatProvider, Data, Result, TgBotError, User};
use tracing::{error, warn};

pub struct Update {
    raw: TgUpdate,
    user: User,
    provider: Arc<dyn ChatProvider>,
    chat: Option<ChatInfo>,
    button: Option<Button>,
}

/// Backslash-escapes the Markdown specials `_`, `*` and `~`.
///
/// Not idempotent: a second pass escapes the same characters again,
/// e.g. `a_b` → `a\_b` → `a\\_b`.
pub fn escape_markdown(text: &str) -> String {
    text.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('~', "\\~")
}

impl Update {
    /// Wraps `raw`; `user` is the already resolved sender.
    pub fn new(raw: TgUpdate, user: User, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            raw,
            user,
            provider,
            chat: None,
            button: None,
        }
    }

    pub fn raw(&self) -> &TgUpdate {
        &self.raw
    }

    pub fn into_raw(self) -> TgUpdate {
        self.raw
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    fn message(&self) -> Option<&Message> {
        match &self.raw.kind {
            UpdateKind::Message(m) => Some(m),
            _ => None,
        }
    }

    fn edited_message(&self) -> Option<&Message> {
        match &self.raw.kind {
            UpdateKind::EditedMessage(m) => Some(m),
            _ => None,
        }
    }

    fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.raw.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    fn inline(&self) -> Option<&InlineQuery> {
        match &self.raw.kind {
            UpdateKind::InlineQuery(q) => Some(q),
            _ => None,
        }
    }

    fn my_chat_member(&self) -> Option<&ChatMemberUpdated> {
        match &self.raw.kind {
            UpdateKind::MyChatMember(m) => Some(m),
            _ => None,
        }
    }

    fn message_text(&self) -> Option<&str> {
        self.message().and_then(|m| m.text())
    }

    // Addressing. Zero and empty values mean "not applicable", never a real id.

    pub fn user_id(&self) -> i64 {
        let from = if let Some(m) = self.message() {
            m.from.as_ref()
        } else if let Some(m) = self.edited_message() {
            m.from.as_ref()
        } else if let Some(q) = self.callback_query() {
            Some(&q.from)
        } else if let Some(q) = self.inline() {
            Some(&q.from)
        } else {
            self.my_chat_member().map(|m| &m.from)
        };
        from.map(|u| u.id.0 as i64).unwrap_or(0)
    }

    pub fn chat_id(&self) -> i64 {
        if let Some(m) = self.message() {
            return m.chat.id.0;
        }
        if let Some(m) = self.edited_message() {
            return m.chat.id.0;
        }
        if let Some(m) = self.callback_query().and_then(|q| q.message.as_ref()) {
            return m.chat().id.0;
        }
        if let Some(m) = self.my_chat_member() {
            return m.chat.id.0;
        }
        0
    }

    /// Id of the clicked message for a button, otherwise of the incoming message.
    pub fn message_id(&self) -> i32 {
        if self.is_button() {
            if let Some(m) = self.callback_query().and_then(|q| q.message.as_ref()) {
                return m.id().0;
            }
        }
        self.message().map(|m| m.id.0).unwrap_or(0)
    }

    /// Id of the inline query, if this update is one.
    pub fn inline_message_id(&self) -> String {
        self.inline().map(|q| q.id.to_string()).unwrap_or_default()
    }

    /// Inline message id of a clicked button, or the inline query id.
    pub fn inline_id(&self) -> String {
        if let Some(q) = self.callback_query() {
            return q.inline_message_id.clone().unwrap_or_default();
        }
        self.inline_message_id()
    }

    pub fn callback_data(&self) -> &str {
        self.callback_query()
            .and_then(|q| q.data.as_deref())
            .unwrap_or("")
    }

    /// Raw text of an inline query.
    pub fn inline_query(&self) -> &str {
        self.inline().map(|q| q.query.as_str()).unwrap_or("")
    }

    /// Message text, Markdown-escaped so it can be echoed back safely.
    pub fn text(&self) -> String {
        self.message_text().map(escape_markdown).unwrap_or_default()
    }

    // Classification.

    pub fn is_command(&self) -> bool {
        self.message_text().is_some_and(|t| t.starts_with('/'))
    }

    pub fn is_plain_text(&self) -> bool {
        !self.is_command() && self.message_text().is_some_and(|t| !t.is_empty())
    }

    pub fn is_button(&self) -> bool {
        !self.callback_data().is_empty()
    }

    /// Private chat message or button, or an inline query sent from the chat with the bot.
    pub fn is_private(&self) -> bool {
        self.message().is_some_and(|m| m.chat.is_private())
            || self
                .callback_query()
                .and_then(|q| q.message.as_ref())
                .is_some_and(|m| m.chat().is_private())
            || self
                .inline()
                .is_some_and(|q| matches!(q.chat_type, Some(ChatType::Sender)))
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.message().is_some() && self.message_text().unwrap_or("") == text
    }

    /// Prefix match against the message text or the inline query text.
    pub fn starts_with_text(&self, prefix: &str) -> bool {
        (self.message().is_some() && self.message_text().unwrap_or("").starts_with(prefix))
            || self.inline().is_some_and(|q| q.query.starts_with(prefix))
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.is_command() && self.message_text() == Some(command)
    }

    pub fn starts_with_command(&self, prefix: &str) -> bool {
        self.is_command() && self.message_text().is_some_and(|t| t.starts_with(prefix))
    }

    // Buttons.

    /// Stored button referenced by the callback data, fetched once per update.
    ///
    /// A failed lookup is logged and yields an empty button.
    pub async fn button(&mut self) -> &Button {
        if self.button.is_none() {
            let button_id = self.callback_data().to_string();
            let button = match self.provider.get_button(&button_id).await {
                Ok(button) => button,
                Err(e) => {
                    log_lookup_failure("button", &button_id, &e);
                    Button::default()
                }
            };
            self.button = Some(button);
        }
        self.button.get_or_insert_with(Button::default)
    }

    /// Looks up any stored button; not cached.
    pub async fn button_by_id(&self, button_id: &str) -> Button {
        match self.provider.get_button(button_id).await {
            Ok(button) => button,
            Err(e) => {
                log_lookup_failure("button", button_id, &e);
                Button::default()
            }
        }
    }

    pub async fn has_action(&mut self, action: &str) -> bool {
        self.is_button() && self.button().await.has_action(action)
    }

    /// Stores a new button so its id can be rendered as callback data.
    pub async fn create_button(&self, action: &str, data: Data) -> Result<Button> {
        let button = Button::new(action, data);
        self.provider.save_button(&button).await?;
        Ok(button)
    }

    // Conversation chain.

    pub async fn has_action_or_chain(&mut self, action_or_chain: &str) -> bool {
        self.has_action(action_or_chain).await || self.has_chain(action_or_chain).await
    }

    pub async fn has_chain(&mut self, chain: &str) -> bool {
        self.chat_info().await.active_chain == chain
    }

    /// Conversation state for the sender, fetched once per update.
    ///
    /// With no stored state the chat id falls back to the user id and the chain data is empty.
    pub async fn chat_info(&mut self) -> &mut ChatInfo {
        let user_id = self.user_id();
        if self.chat.is_none() {
            let chat = match self.provider.get_chat_info(user_id).await {
                Ok(chat) => chat,
                Err(e) => {
                    log_lookup_failure("chat info", &user_id.to_string(), &e);
                    ChatInfo::default()
                }
            };
            self.chat = Some(chat);
        }
        let chat = self.chat.get_or_insert_with(ChatInfo::default);
        if chat.chat_id == 0 {
            chat.chat_id = user_id;
        }
        chat
    }

    /// Persists the cached chat info. Failures are logged only.
    pub async fn flush_chat_info(&mut self) {
        let chat = self.chat_info().await.clone();
        if let Err(e) = self.provider.save_chat_info(&chat).await {
            error!(chat_id = chat.chat_id, chat = ?chat, error = %e, "cannot save chat info");
        }
    }

    /// Persists an explicit record; the cached chat info is left untouched.
    pub async fn save_chat_info(&self, info: &ChatInfo) -> Result<()> {
        self.provider.save_chat_info(info).await
    }

    pub async fn start_chain(&mut self, chain: &str) -> &mut Self {
        self.chat_info().await.active_chain = chain.to_string();
        self
    }

    pub async fn start_chain_step(&mut self, step: &str) -> &mut Self {
        self.chat_info().await.active_chain_step = step.to_string();
        self
    }

    pub async fn chain(&mut self) -> String {
        self.chat_info().await.active_chain.clone()
    }

    pub async fn chain_step(&mut self) -> String {
        self.chat_info().await.active_chain_step.clone()
    }

    pub async fn add_chain_data(&mut self, key: &str, value: &str) -> &mut Self {
        self.chat_info().await.chain_data.insert(key, value);
        self
    }

    pub async fn get_chain_data(&mut self, key: &str) -> String {
        self.chat_info().await.chain_data.get(key).to_string()
    }

    /// Clears chain name, step and data in one assignment.
    pub async fn finish_chain(&mut self) -> &mut Self {
        let chat = self.chat_info().await;
        *chat = ChatInfo::new(chat.chat_id);
        self
    }
}

fn log_lookup_failure(what: &str, key: &str, err: &TgBotError) {
    if err.is_not_found() {
        warn!(key = %key, error = %err, "cannot find {}", what);
    } else {
        error!(key = %key, error = %err, "cannot load {}", what);
    }
}
