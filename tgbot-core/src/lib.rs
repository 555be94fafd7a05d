//! # tgbot-core
//!
//! Transport-agnostic pieces of the bot layer: the [`Button`], [`ChatInfo`], [`User`] and [`Data`]
//! records, the [`ChatProvider`] persistence trait, the error taxonomy and tracing initialization.
//! Used by tgbot-telegram and tgbot-storage.

pub mod error;
pub mod logger;
pub mod provider;
pub mod types;

pub use error::{BuildError, Result, TgBotError};
pub use logger::init_tracing;
pub use provider::ChatProvider;
pub use types::{Button, ChatInfo, Data, User};
