//! Active identity level
//!
//! Process-wide "which identity is visible" state, owned by the
//! authentication component and read by account-visibility filtering
//! through the accessor trait. Deliberately an injectable cell, not a
//! global.

use haven_core::Level;
use tokio::sync::watch;

/// Read access to the active level for downstream consumers.
pub trait ActiveLevelProvider: Send + Sync {
    /// Current active level.
    fn active_level(&self) -> Level;

    /// Subscribe to level changes.
    fn subscribe(&self) -> watch::Receiver<Level>;
}

/// Watch-backed active-level cell.
///
/// Mutated only by successful unlock, biometric unlock, or default-level
/// initialization at cold start.
pub struct ActiveLevelCell {
    tx: watch::Sender<Level>,
}

impl ActiveLevelCell {
    /// Create a cell initialized to the primary level.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Level::PRIMARY);
        Self { tx }
    }

    /// Set the active level, notifying subscribers.
    pub fn set(&self, level: Level) {
        self.tx.send_replace(level);
    }
}

impl Default for ActiveLevelCell {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveLevelProvider for ActiveLevelCell {
    fn active_level(&self) -> Level {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Level> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_primary() {
        let cell = ActiveLevelCell::new();
        assert_eq!(cell.active_level(), Level::PRIMARY);
    }

    #[test]
    fn test_set_notifies_subscribers() {
        let cell = ActiveLevelCell::new();
        let mut rx = cell.subscribe();

        cell.set(Level::new(1).unwrap());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Level::new(1).unwrap());
    }
}
