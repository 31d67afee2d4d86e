//! App-lifecycle-driven lock state machine
//!
//! The lock manager owns the raw locked flag. Going to the background only
//! records a timestamp; coming back to the foreground re-locks unless a
//! one-shot `keep_unlocked` flag was armed since the last background
//! transition (covers in-progress biometric prompts). All transitions go
//! through one mutex, so concurrent lifecycle signals cannot interleave.

use crate::Result;
use haven_core::Level;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Raw lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// App is locked
    Locked,
    /// App is unlocked
    Unlocked,
}

/// Persists the wall-clock timestamp of the last app exit as an audit
/// record for the host. Relaunch always boots locked, so the manager only
/// ever writes this value.
pub trait LastExitStore: Send + Sync {
    /// Save the exit timestamp (unix seconds).
    fn save_last_exit(&self, timestamp: i64) -> Result<()>;
}

/// In-memory exit-timestamp store for tests.
#[derive(Default)]
pub struct MemoryLastExitStore {
    timestamp: Mutex<Option<i64>>,
}

impl MemoryLastExitStore {
    /// Create empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved exit timestamp, if any.
    pub fn last_exit(&self) -> Option<i64> {
        *self.timestamp.lock()
    }
}

impl LastExitStore for MemoryLastExitStore {
    fn save_last_exit(&self, timestamp: i64) -> Result<()> {
        *self.timestamp.lock() = Some(timestamp);
        Ok(())
    }
}

struct LockInner {
    locked: bool,
    keep_unlocked: bool,
    backgrounded_at: Option<Instant>,
    last_unlocked_level: Level,
}

/// Lock/unlock lifecycle state machine.
///
/// Boots locked: a process relaunch after being destroyed while backgrounded
/// must behave as locked.
pub struct LockManager {
    inner: Mutex<LockInner>,
    raw_locked_tx: watch::Sender<bool>,
    exit_store: Arc<dyn LastExitStore>,
}

impl LockManager {
    /// Create a lock manager in the locked state.
    pub fn new(exit_store: Arc<dyn LastExitStore>) -> Self {
        let (raw_locked_tx, _) = watch::channel(true);
        Self {
            inner: Mutex::new(LockInner {
                locked: true,
                keep_unlocked: false,
                backgrounded_at: None,
                last_unlocked_level: Level::PRIMARY,
            }),
            raw_locked_tx,
            exit_store,
        }
    }

    /// Current raw lock state (before the "no pin set" override).
    pub fn state(&self) -> LockState {
        if self.inner.lock().locked {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }

    /// Subscribe to raw lock-flag changes.
    pub fn subscribe_raw(&self) -> watch::Receiver<bool> {
        self.raw_locked_tx.subscribe()
    }

    /// Force unlocked; clears the one-shot keep-unlocked flag.
    pub fn on_unlock(&self, level: Level) {
        let mut inner = self.inner.lock();
        inner.locked = false;
        inner.keep_unlocked = false;
        inner.last_unlocked_level = level;
        self.raw_locked_tx.send_replace(false);
    }

    /// Force locked.
    pub fn lock(&self) {
        let mut inner = self.inner.lock();
        inner.locked = true;
        self.raw_locked_tx.send_replace(true);
    }

    /// Arm the one-shot flag consulted on the next foreground transition.
    pub fn keep_unlocked(&self) {
        self.inner.lock().keep_unlocked = true;
    }

    /// Last level that was successfully unlocked (for biometric unlock).
    pub fn last_unlocked_level(&self) -> Level {
        self.inner.lock().last_unlocked_level
    }

    /// App went to background: record the moment and persist the exit date.
    /// Does not itself lock.
    pub fn on_enter_background(&self) {
        self.inner.lock().backgrounded_at = Some(Instant::now());
        self.update_last_exit_date();
    }

    /// App came to foreground: re-lock unless `keep_unlocked` was armed
    /// since the last background transition. The flag is consumed either
    /// way.
    pub fn on_enter_foreground(&self) {
        let mut inner = self.inner.lock();
        let keep = inner.keep_unlocked;
        inner.keep_unlocked = false;
        inner.backgrounded_at = None;

        if !keep {
            inner.locked = true;
            self.raw_locked_tx.send_replace(true);
            tracing::debug!("Re-locked on foreground transition");
        }
    }

    /// Process is likely being killed: lock unconditionally.
    pub fn on_all_activities_destroyed(&self) {
        let mut inner = self.inner.lock();
        inner.locked = true;
        inner.keep_unlocked = false;
        self.raw_locked_tx.send_replace(true);
        tracing::info!("Locked: all activities destroyed");
    }

    /// Persist the wall-clock exit timestamp.
    pub fn update_last_exit_date(&self) {
        if let Err(e) = self
            .exit_store
            .save_last_exit(chrono::Utc::now().timestamp())
        {
            tracing::warn!(error = %e, "Failed to persist last exit date");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> LockManager {
        LockManager::new(Arc::new(MemoryLastExitStore::new()))
    }

    #[test]
    fn test_boots_locked() {
        let lock = manager();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_unlock_and_lock() {
        let lock = manager();
        lock.on_unlock(Level::PRIMARY);
        assert_eq!(lock.state(), LockState::Unlocked);

        lock.lock();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_background_does_not_lock() {
        let lock = manager();
        lock.on_unlock(Level::PRIMARY);

        lock.on_enter_background();
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[test]
    fn test_foreground_relocks() {
        let lock = manager();
        lock.on_unlock(Level::PRIMARY);

        lock.on_enter_background();
        lock.on_enter_foreground();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_keep_unlocked_is_one_shot() {
        let lock = manager();
        lock.on_unlock(Level::PRIMARY);

        lock.keep_unlocked();
        lock.on_enter_background();
        lock.on_enter_foreground();
        assert_eq!(lock.state(), LockState::Unlocked);

        // Consumed: next foreground transition locks again
        lock.on_enter_background();
        lock.on_enter_foreground();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_unlock_clears_keep_unlocked() {
        let lock = manager();
        lock.keep_unlocked();
        lock.on_unlock(Level::PRIMARY);

        lock.on_enter_background();
        lock.on_enter_foreground();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_all_activities_destroyed_forces_lock() {
        let lock = manager();
        lock.on_unlock(Level::PRIMARY);
        lock.keep_unlocked();

        lock.on_all_activities_destroyed();
        assert_eq!(lock.state(), LockState::Locked);

        // keep_unlocked did not survive
        lock.on_enter_foreground();
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[test]
    fn test_background_persists_exit_date() {
        let store = Arc::new(MemoryLastExitStore::new());
        let lock = LockManager::new(store.clone());

        assert_eq!(store.last_exit(), None);
        lock.on_enter_background();
        assert!(store.last_exit().is_some());
    }

    #[test]
    fn test_watch_publishes_transitions() {
        let lock = manager();
        let mut rx = lock.subscribe_raw();
        assert!(*rx.borrow_and_update());

        lock.on_unlock(Level::PRIMARY);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
    }
}
