use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure taxonomy shared by every component. The API layer maps each kind
/// to one HTTP status.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// The identity provider or AI endpoint failed or was unreachable.
    #[error("{0}")]
    Upstream(String),
    /// The AI endpoint answered with text that does not hold the expected JSON.
    #[error("AI response not in expected JSON format")]
    MalformedUpstream { raw: String },
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Wraps a storage-layer error, keeping only its display text.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
