//! Fluent builder for one outbound message or message edit.
//!
//! Rows are addressed through an explicit cursor: `add_keyboard_row` / `add_reply_keyboard_row`
//! append a row and point the cursor at it, and every `add_*button` call appends to that row.
//! A button added before any row is recorded and reported by [`MessageBuilder::build`].

use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, ChatId, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    KeyboardButton, KeyboardMarkup, KeyboardRemove, MessageId, ParseMode, ReplyMarkup,
    ReplyParameters, WebAppInfo,
};
use tgbot_core::{BuildError, Result, TgBotError};
use tracing::debug;

/// Parse mode used for every text, caption and article body.
#[allow(deprecated)]
pub const PARSE_MODE: ParseMode = ParseMode::Markdown;

#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    edit_message: bool,
    remove_reply_keyboard: bool,
    chat_id: i64,
    reply_message_id: i32,
    message_id: i32,
    inline_id: String,
    text: String,
    photo_id: String,
    keyboard: Vec<Vec<InlineKeyboardButton>>,
    keyboard_row: Option<usize>,
    reply_keyboard: Vec<Vec<KeyboardButton>>,
    reply_keyboard_row: Option<usize>,
    error: Option<BuildError>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edits `message_id` in `chat_id` instead of sending a new message.
    pub fn edit_message_text_and_markup(mut self, chat_id: i64, message_id: i32) -> Self {
        self.chat_id = chat_id;
        self.message_id = message_id;
        self.edit_message = true;
        self
    }

    pub fn new_message(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self.edit_message = false;
        self
    }

    /// New message when `message_id` is 0, otherwise an edit of that message.
    pub fn message(self, chat_id: i64, message_id: i32) -> Self {
        if message_id == 0 {
            self.new_message(chat_id)
        } else {
            self.edit_message_text_and_markup(chat_id, message_id)
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn chat_id(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn reply_message_id(mut self, reply_message_id: i32) -> Self {
        self.reply_message_id = reply_message_id;
        self
    }

    pub fn remove_reply_keyboard(mut self) -> Self {
        self.remove_reply_keyboard = true;
        self
    }

    pub fn photo_id(mut self, file_id: impl Into<String>) -> Self {
        self.photo_id = file_id.into();
        self
    }

    pub fn message_id(mut self, message_id: i32) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn inline_id(mut self, inline_id: impl Into<String>) -> Self {
        self.inline_id = inline_id.into();
        self
    }

    pub fn edit(mut self, edit_message: bool) -> Self {
        self.edit_message = edit_message;
        self
    }

    pub fn add_keyboard_row(mut self) -> Self {
        self.keyboard.push(Vec::new());
        self.keyboard_row = Some(self.keyboard.len() - 1);
        self
    }

    pub fn add_reply_keyboard_row(mut self) -> Self {
        self.reply_keyboard.push(Vec::new());
        self.reply_keyboard_row = Some(self.reply_keyboard.len() - 1);
        self
    }

    /// Inline button carrying `callback_data`, usually a stored button id.
    pub fn add_button(self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.push_button(InlineKeyboardButton::callback(text, callback_data))
    }

    pub fn add_button_url(self, text: impl Into<String>, url: Url) -> Self {
        self.push_button(InlineKeyboardButton::url(text, url))
    }

    /// Inline button that switches the user to an inline query with `query` prefilled.
    pub fn add_button_switch(self, text: impl Into<String>, query: impl Into<String>) -> Self {
        self.push_button(InlineKeyboardButton::switch_inline_query(text, query))
    }

    pub fn add_web_app_button(self, text: impl Into<String>, url: Url) -> Self {
        self.push_button(InlineKeyboardButton::web_app(text, WebAppInfo { url }))
    }

    pub fn add_reply_button(self, text: impl Into<String>) -> Self {
        self.push_reply_button(KeyboardButton::new(text))
    }

    pub fn add_reply_web_app_button(self, text: impl Into<String>, url: Url) -> Self {
        self.push_reply_button(
            KeyboardButton::new(text).request(ButtonRequest::WebApp(WebAppInfo { url })),
        )
    }

    pub fn add_reply_request_contact_button(self, text: impl Into<String>) -> Self {
        self.push_reply_button(KeyboardButton::new(text).request(ButtonRequest::Contact))
    }

    fn push_button(mut self, button: InlineKeyboardButton) -> Self {
        let Some(row) = self.keyboard_row.and_then(|i| self.keyboard.get_mut(i)) else {
            self.error
                .get_or_insert(BuildError::MissingKeyboardRow(button.text));
            return self;
        };
        row.push(button);
        self
    }

    fn push_reply_button(mut self, button: KeyboardButton) -> Self {
        let Some(row) = self
            .reply_keyboard_row
            .and_then(|i| self.reply_keyboard.get_mut(i))
        else {
            self.error
                .get_or_insert(BuildError::MissingKeyboardRow(button.text));
            return self;
        };
        row.push(button);
        self
    }

    /// Resolves the accumulated state into a request.
    ///
    /// Edit mode wins over photo, photo wins over plain text. Empty rows are dropped; for a text
    /// message the inline keyboard wins over the reply keyboard, which wins over keyboard removal.
    pub fn build(self) -> Result<OutboundMessage> {
        if let Some(err) = self.error {
            return Err(TgBotError::Builder(err));
        }

        let keyboard = non_empty_rows(self.keyboard);
        let reply_keyboard = non_empty_rows(self.reply_keyboard);
        let chat_id = ChatId(self.chat_id);

        if self.edit_message {
            let target = if self.inline_id.is_empty() {
                EditTarget::Chat {
                    chat_id,
                    message_id: MessageId(self.message_id),
                }
            } else {
                EditTarget::Inline(self.inline_id)
            };
            let reply_markup = if keyboard.is_empty() {
                None
            } else {
                Some(InlineKeyboardMarkup::new(keyboard))
            };
            return Ok(OutboundMessage::EditText(EditText {
                target,
                text: self.text,
                reply_markup,
            }));
        }

        if !self.photo_id.is_empty() {
            return Ok(OutboundMessage::Photo(PhotoMessage {
                chat_id,
                photo_id: self.photo_id,
                caption: self.text,
            }));
        }

        let reply_markup = if !keyboard.is_empty() {
            Some(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(
                keyboard,
            )))
        } else if !reply_keyboard.is_empty() {
            Some(ReplyMarkup::Keyboard(KeyboardMarkup::new(reply_keyboard)))
        } else if self.remove_reply_keyboard {
            Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new()))
        } else {
            None
        };

        Ok(OutboundMessage::Text(TextMessage {
            chat_id,
            text: self.text,
            reply_to: (self.reply_message_id != 0).then_some(MessageId(self.reply_message_id)),
            reply_markup,
        }))
    }
}

fn non_empty_rows<T>(rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
    rows.into_iter().filter(|row| !row.is_empty()).collect()
}

/// Request produced by [`MessageBuilder::build`].
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Text(TextMessage),
    Photo(PhotoMessage),
    EditText(EditText),
}

#[derive(Debug, Clone)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub reply_markup: Option<ReplyMarkup>,
}

#[derive(Debug, Clone)]
pub struct PhotoMessage {
    pub chat_id: ChatId,
    pub photo_id: String,
    pub caption: String,
}

/// Edit of an existing message; `reply_markup` is set when the edit also replaces the keyboard.
#[derive(Debug, Clone)]
pub struct EditText {
    pub target: EditTarget,
    pub text: String,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Chat { chat_id: ChatId, message_id: MessageId },
    Inline(String),
}

impl OutboundMessage {
    /// Sends the request through teloxide with the Markdown parse mode.
    pub async fn send(self, bot: &teloxide::Bot) -> Result<()> {
        match self {
            OutboundMessage::Text(msg) => {
                debug!(chat_id = msg.chat_id.0, "Sending text message");
                let mut req = bot.send_message(msg.chat_id, msg.text).parse_mode(PARSE_MODE);
                if let Some(reply_to) = msg.reply_to {
                    req = req.reply_parameters(ReplyParameters::new(reply_to));
                }
                if let Some(markup) = msg.reply_markup {
                    req = req.reply_markup(markup);
                }
                req.await.map_err(|e| TgBotError::Bot(e.to_string()))?;
            }
            OutboundMessage::Photo(msg) => {
                debug!(chat_id = msg.chat_id.0, "Sending photo");
                bot.send_photo(msg.chat_id, InputFile::file_id(FileId(msg.photo_id)))
                    .caption(msg.caption)
                    .parse_mode(PARSE_MODE)
                    .await
                    .map_err(|e| TgBotError::Bot(e.to_string()))?;
            }
            OutboundMessage::EditText(edit) => match edit.target {
                EditTarget::Chat {
                    chat_id,
                    message_id,
                } => {
                    debug!(chat_id = chat_id.0, message_id = message_id.0, "Editing message");
                    let mut req = bot
                        .edit_message_text(chat_id, message_id, edit.text)
                        .parse_mode(PARSE_MODE);
                    if let Some(markup) = edit.reply_markup {
                        req = req.reply_markup(markup);
                    }
                    req.await.map_err(|e| TgBotError::Bot(e.to_string()))?;
                }
                EditTarget::Inline(inline_message_id) => {
                    debug!(inline_message_id = %inline_message_id, "Editing inline message");
                    let mut req = bot
                        .edit_message_text_inline(inline_message_id, edit.text)
                        .parse_mode(PARSE_MODE);
                    if let Some(markup) = edit.reply_markup {
                        req = req.reply_markup(markup);
                    }
                    req.await.map_err(|e| TgBotError::Bot(e.to_string()))?;
                }
            },
        }
        Ok(())
    }
}
