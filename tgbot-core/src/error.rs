use thiserror::Error;

#[derive(Error, Debug)]
pub enum TgBotError {
    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Long polling already started")]
    PollingAlreadyStarted,

    #[error("No sender in update: {0}")]
    NoSender(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Builder error: {0}")]
    Builder(#[from] BuildError),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Misuse of a message or inline-result builder, reported by `build()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("button `{0}` added before any keyboard row")]
    MissingKeyboardRow(String),

    #[error("keyboard used before any article was added")]
    MissingArticle,
}

pub type Result<T> = std::result::Result<T, TgBotError>;

impl TgBotError {
    /// True for the "row does not exist" outcome as opposed to a backend failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TgBotError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_converts_into_tgbot_error() {
        let err: TgBotError = BuildError::MissingKeyboardRow("OK".to_string()).into();
        assert!(matches!(err, TgBotError::Builder(_)));
        assert_eq!(
            err.to_string(),
            "Builder error: button `OK` added before any keyboard row"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(TgBotError::NotFound("chat 1".to_string()).is_not_found());
        assert!(!TgBotError::Storage("disk full".to_string()).is_not_found());
    }
}
