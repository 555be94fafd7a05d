//! Storage crate: [`ChatProvider`](tgbot_core::ChatProvider) backends.
//!
//! ## Modules
//!
//! - [`sqlite_provider`] – SqliteChatProvider (chats, buttons, users tables)
//! - [`memory_provider`] – InMemoryChatProvider for tests and demos
//! - [`sqlite_pool`] – SqlitePoolManager

mod memory_provider;
mod sqlite_pool;
mod sqlite_provider;

pub use memory_provider::InMemoryChatProvider;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_provider::SqliteChatProvider;
