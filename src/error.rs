// Error types for the playlist store
// The app layer wraps these in anyhow, the store keeps them typed

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("playlist {0} not found")]
    PlaylistNotFound(i64),

    #[error("playlist database lock poisoned")]
    LockPoisoned,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
