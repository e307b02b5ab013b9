//! Engine errors and their user-facing categories.

use dermabot_store::StoreError;
use thiserror::Error;

use crate::texts;

/// Failures inside an admin workflow step.
///
/// Only [`user_message`](BotError::user_message) is ever shown to the
/// user; the `Display` text with full detail goes to the log.
#[derive(Error, Debug)]
pub enum BotError {
    /// Input the user can correct and resend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The selected item no longer exists.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A change could not be persisted.
    #[error("Save failed: {0}")]
    SaveFailed(#[source] StoreError),
}

impl BotError {
    pub fn user_message(&self) -> String {
        match self {
            BotError::InvalidInput(detail) => texts::input_error(detail),
            BotError::ItemNotFound(_) => texts::ITEM_NOT_FOUND.to_string(),
            BotError::SaveFailed(_) => texts::SAVE_FAILED.to_string(),
        }
    }

    /// Whether the workflow should re-prompt instead of resetting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::InvalidInput(_))
    }
}

impl From<StoreError> for BotError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ItemNotFound { name, .. } => BotError::ItemNotFound(name),
            other => BotError::SaveFailed(other),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use dermabot_core::Section;

    #[test]
    fn test_store_errors_map_to_categories() {
        let err: BotError = StoreError::ItemNotFound {
            section: Section::Tests,
            name: "x".into(),
        }
        .into();
        assert!(matches!(err, BotError::ItemNotFound(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BotError = StoreError::Io {
            path: "/data/tests/structure.json".into(),
            source: io,
        }
        .into();
        assert!(matches!(err, BotError::SaveFailed(_)));
        // Internal detail stays out of the user message
        assert!(!err.user_message().contains("/data"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_input_message() {
        let err = BotError::InvalidInput("пустое название".into());
        assert!(err.is_recoverable());
        assert_eq!(
            err.user_message(),
            "Ошибка: пустое название. Попробуйте снова или выберите 'Отмена'."
        );
    }
}
