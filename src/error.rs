use thiserror::Error;

use crate::view::validator::MoveRejection;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from store operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The destination path is already taken.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// A move that would break the folder hierarchy.
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] MoveRejection),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Saving the persisted view state failed.
    #[error("Persist error: {0}")]
    Persist(String),
}

impl AppError {
    /// Short form for the status bar.
    pub fn notice(&self) -> String {
        match self {
            AppError::Io(e) => format!("✗ {}", e),
            AppError::Conflict(path) => format!("✗ {} already exists", path),
            AppError::InvalidMove(reason) => format!("✗ {}", reason),
            other => format!("✗ {}", other),
        }
    }
}
