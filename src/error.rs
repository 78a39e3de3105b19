//! Error types for the task-module bot.

/// Top-level error type for a bot turn.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a stale-write conflict that warrants replaying the turn.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Conflict { .. }))
    }

    /// Whether this error comes from a misconfigured dialog set or environment.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Configuration-related errors. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Dialog {id} is not registered")]
    DialogNotFound { id: String },

    #[error("Dialog {id} is registered more than once")]
    DuplicateDialog { id: String },

    #[error("Dialog {id} is a {kind} and cannot be used here")]
    WrongDialogKind { id: String, kind: String },
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Write conflict on {key}: stored etag does not match")]
    Conflict { key: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Invalid activity: {0}")]
    InvalidActivity(String),

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Errors raised while driving the dialog stack.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Dialog stack is empty")]
    EmptyStack,

    #[error("Step {index} is out of range for dialog {dialog_id}")]
    StepOutOfRange { dialog_id: String, index: usize },

    #[error("Step value {key} was never set")]
    MissingValue { key: String },

    #[error("Step value {key} is not a valid {expected}")]
    InvalidValue { key: String, expected: String },
}

/// An attachment that cannot be echoed back to the user.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Attachment has neither a URL nor inline content")]
    MissingContent,

    #[error("Attachment content type {0} cannot be displayed")]
    UnsupportedContentType(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_detected_through_top_level_error() {
        let err: Error = StorageError::Conflict {
            key: "conversation/cli/1".into(),
        }
        .into();
        assert!(err.is_conflict());
        assert!(!err.is_config());
    }

    #[test]
    fn config_errors_are_flagged() {
        let err: Error = ConfigError::DialogNotFound { id: "Missing".into() }.into();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: Dialog Missing is not registered"
        );
    }
}
