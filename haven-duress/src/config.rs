//! Dispatcher configuration

use std::time::Duration;

/// Tunables for covert-alert dispatch.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// How long to wait for the registry's own adapter of the active
    /// account to come up before constructing our own
    pub adapter_await_timeout: Duration,
    /// Per-candidate bound on reaching a send-ready sync state
    pub sync_timeout: Duration,
    /// Adapter construction attempts while the identity tag is busy
    pub create_attempts: u32,
    /// Base delay between construction attempts
    pub create_backoff: Duration,
    /// Alert amount in base units
    pub alert_amount: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            adapter_await_timeout: Duration::from_secs(15),
            sync_timeout: Duration::from_secs(90),
            create_attempts: 3,
            create_backoff: Duration::from_millis(500),
            alert_amount: 10_000,
        }
    }
}
