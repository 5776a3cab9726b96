// MIT License - Copyright (c) 2026 Peter Wright
// Alarm receiver error types

/// Boxed error returned by registered event handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can occur in the alarm-receiver library.
///
/// Decode misses are not represented here: decoders return `Option` and an
/// unrecognised line is ordinary operational noise.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection idle for more than {secs}s")]
    IdleTimeout { secs: u64 },

    #[error("Alert storage failed: {details}")]
    Storage { details: String },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReceiverError {
    pub fn storage(details: impl Into<String>) -> Self {
        Self::Storage {
            details: details.into(),
        }
    }

    /// Whether the error came from the alert storage collaborator.
    pub fn is_storage(&self) -> bool {
        matches!(self, ReceiverError::Storage { .. } | ReceiverError::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, ReceiverError>;
