//! Adapters from Telegram (teloxide) types to tgbot_core types.

use teloxide::types::{Update as TgUpdate, UpdateKind};
use tgbot_core::User;

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> TelegramUserWrapper<'a> {
    pub fn to_core(&self) -> User {
        User {
            user_id: self.0.id.0 as i64,
            display_name: self.0.first_name.clone(),
            last_name: self.0.last_name.clone(),
            phone: None,
            user_name: self.0.username.clone(),
        }
    }
}

/// Returns the user who caused the update.
///
/// Checked in order: callback query, message, edited message, inline query, my-chat-member,
/// pre-checkout query. Any other update kind has no sender.
pub fn sender_of(update: &TgUpdate) -> Option<&teloxide::types::User> {
    match &update.kind {
        UpdateKind::CallbackQuery(q) => Some(&q.from),
        UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => m.from.as_ref(),
        UpdateKind::InlineQuery(q) => Some(&q.from),
        UpdateKind::MyChatMember(m) => Some(&m.from),
        UpdateKind::PreCheckoutQuery(q) => Some(&q.from),
        _ => None,
    }
}
