use axum::http::StatusCode;

/// Errors the game engine lets escape to its callers.
///
/// Storage and collaborator failures never show up here; they are absorbed
/// where they happen and replaced by a fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid operand range: {0}")]
    InvalidRange(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Level {0} not found")]
    NotFound(String),

    #[error("Level {0} is locked")]
    Locked(String),

    #[error("Session {0} not found")]
    SessionNotFound(String),
}

impl GameError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::InvalidRange(_) | GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound(_) | GameError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GameError::Locked(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Storage-layer failure. Never leaves the progress store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("Storage backend poisoned")]
    Poisoned,
}
