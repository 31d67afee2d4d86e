//! Error types for PIN authentication

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// PIN authentication errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid pin format
    #[error("Invalid pin: {0}")]
    InvalidPin(String),

    /// Pin already assigned to another level
    #[error("Pin already in use")]
    PinNotUnique,

    /// Hashing error
    #[error("Hash error: {0}")]
    Hash(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Secure wipe failed
    #[error("Wipe failed: {0}")]
    Wipe(String),
}
