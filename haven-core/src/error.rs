//! Error types for Haven core

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Haven core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid identity level
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Memo too long
    #[error("Memo too long: {0}")]
    MemoTooLong(String),

    /// Invalid memo
    #[error("Invalid memo: {0}")]
    InvalidMemo(String),

    /// Invalid account reference
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
}
