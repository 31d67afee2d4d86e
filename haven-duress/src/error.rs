//! Error types for covert-alert dispatch

/// Result type for dispatch attempts
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Result type for adapter operations
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Terminal outcomes of a failed dispatch attempt.
///
/// All of these are caught and logged at the dispatch task boundary; none
/// ever surfaces to the unlock flow that triggered the attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No eligible wallet exists for the configured account
    #[error("No eligible wallet for configured account")]
    WalletNotFound,

    /// Every candidate variant failed adapter construction after retries
    #[error("Adapter creation failed for all candidates")]
    AdapterCreationFailed,

    /// Every candidate synced, none had enough balance for the alert
    #[error("Insufficient balance on all synced candidates")]
    InsufficientBalance,

    /// The winning adapter failed to send
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Bounded wait exceeded without a send-ready adapter
    #[error("Timed out waiting for a send-ready adapter")]
    Timeout,
}

/// Errors from a single transaction adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Another session with the same identity tag is still shutting down;
    /// construction can be retried
    #[error("Adapter busy: {0}")]
    Busy(String),

    /// Construction failed for good
    #[error("Adapter creation failed: {0}")]
    Creation(String),

    /// Send failed
    #[error("Send failed: {0}")]
    Send(String),

    /// Adapter was stopped while in use
    #[error("Adapter stopped")]
    Stopped,
}

impl AdapterError {
    /// Whether construction may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdapterError::Busy(_))
    }
}
