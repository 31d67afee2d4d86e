//! Account registry contract
//!
//! Read-only view of the host's account catalog, scoped by identity level.

use haven_core::{Account, AccountId, Level};

/// Host account registry.
pub trait AccountRegistry: Send + Sync {
    /// Look up an account by id.
    fn account(&self, id: &AccountId) -> Option<Account>;

    /// The currently active foreground account, if any.
    fn active_account(&self) -> Option<Account>;

    /// All accounts visible at a level.
    fn accounts_for_level(&self, level: Level) -> Vec<Account>;
}
