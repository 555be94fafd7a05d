//! # tgbot-telegram
//!
//! Telegram layer over teloxide: [`MessageBuilder`] and [`InlineRequestBuilder`] for outbound
//! requests, the [`Update`] wrapper with classification helpers and per-chat conversation chains,
//! and the [`TgBot`] facade running the long-polling loop.
//! Persistence goes through [`tgbot_core::ChatProvider`]; no storage backend is wired in here.

mod adapters;
mod bot;
mod config;
mod handler;
mod inline;
mod message;
mod update;

pub use adapters::{sender_of, TelegramUserWrapper};
pub use bot::{TgBot, POLL_TIMEOUT};
pub use config::TelegramConfig;
pub use handler::UpdateHandler;
pub use inline::{InlineAnswer, InlineRequestBuilder};
pub use message::{
    EditTarget, EditText, MessageBuilder, OutboundMessage, PhotoMessage, TextMessage, PARSE_MODE,
};
pub use update::{escape_markdown, Update};

pub use teloxide;
