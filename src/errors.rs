use thiserror::Error;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Revision conflict on {id}: submitted {submitted}, current {current}")]
    Conflict { id: String, submitted: String, current: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: String, id: String },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Cursor expired")]
    CursorExpired,

    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl SdkError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The caller should re-read the entity and reapply its change.
    #[must_use]
    pub const fn is_retryable_after_refetch(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Pagination has to start over with no cursor.
    #[must_use]
    pub const fn requires_restart(&self) -> bool {
        matches!(self, Self::InvalidCursor(_) | Self::CursorExpired)
    }
}

impl From<std::io::Error> for SdkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
