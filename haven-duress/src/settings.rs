//! Per-level notify configuration
//!
//! A user configures, while on level N, what should happen when someone is
//! coerced past that level: which account pays the alert, where it goes,
//! and the marker memo. The dispatcher reads the config for `entered - 1`
//! when level `entered` is unlocked. Absent or incomplete configuration is
//! not an error; it simply means no alert.

use haven_core::{AccountId, Level};
use serde::{Deserialize, Serialize};

/// Covert-alert configuration for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Account that funds the alert
    pub account_id: AccountId,
    /// Destination address of the trusted party
    pub address: String,
    /// Marker memo carried by the alert transaction
    pub memo: String,
}

impl NotifyConfig {
    /// Whether this config is actionable.
    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

/// Settings collaborator owning the per-level notify configurations.
pub trait AlertSettings: Send + Sync {
    /// Notify config stored for a level, if any.
    fn notify_config(&self, level: Level) -> Option<NotifyConfig>;
}
