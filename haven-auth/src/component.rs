//! PIN component
//!
//! Orchestrates the pin-level store, the lock manager, and the active-level
//! cell. Unlocking with a duress pin hands off to the covert-alert
//! dispatcher as a fire-and-forget side effect; unlocking with the
//! secure-reset pin wipes all data and re-arms the entered pin as the new
//! primary pin.

use crate::active_level::{ActiveLevelCell, ActiveLevelProvider};
use crate::lock::LockManager;
use crate::pin_store::PinLevelStore;
use crate::Result;
use haven_core::Level;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Wipes all wallet data. Invoked synchronously (awaited) before the
/// secure-reset pin is re-armed at level 0.
#[async_trait::async_trait]
pub trait SecureWipe: Send + Sync {
    /// Destroy all account, wallet, and settings data.
    async fn reset_all_data(&self) -> Result<()>;
}

/// Receives the duress-entry event. Implementations must return
/// immediately; the alert itself runs detached from the unlock call.
pub trait DuressAlertSink: Send + Sync {
    /// A duress level was just entered by pin unlock.
    fn on_duress_entered(&self, entered: Level);
}

/// Duress-scoped policy hooks owned by the settings layer.
pub trait DuressPolicy: Send + Sync {
    /// Revoke any duress-scoped account allow-list. Called whenever a pin
    /// is disabled.
    fn revoke_account_filters(&self);
}

/// Emitted on the pin-event stream when levels are armed or cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSetEvent {
    /// A pin was stored for this level
    Set(Level),
    /// The pin for this level was cleared
    Disabled(Level),
}

/// Authentication component: the public surface of the PIN subsystem.
pub struct PinComponent {
    store: Arc<PinLevelStore>,
    lock: Arc<LockManager>,
    active_level: Arc<ActiveLevelCell>,
    wipe: Arc<dyn SecureWipe>,
    policy: Arc<dyn DuressPolicy>,
    alert_sink: Arc<dyn DuressAlertSink>,
    unlock_gate: tokio::sync::Mutex<()>,
    is_locked_tx: watch::Sender<bool>,
    pin_events_tx: broadcast::Sender<PinSetEvent>,
}

impl PinComponent {
    /// Wire up the component. Starts at the primary level, locked iff a pin
    /// is set.
    pub fn new(
        store: Arc<PinLevelStore>,
        lock: Arc<LockManager>,
        wipe: Arc<dyn SecureWipe>,
        policy: Arc<dyn DuressPolicy>,
        alert_sink: Arc<dyn DuressAlertSink>,
    ) -> Self {
        let active_level = Arc::new(ActiveLevelCell::new());
        let initially_locked = store.is_any_pin_set();
        let (is_locked_tx, _) = watch::channel(initially_locked);
        let (pin_events_tx, _) = broadcast::channel(16);

        Self {
            store,
            lock,
            active_level,
            wipe,
            policy,
            alert_sink,
            unlock_gate: tokio::sync::Mutex::new(()),
            is_locked_tx,
            pin_events_tx,
        }
    }

    /// Accessor for downstream account-visibility filtering.
    pub fn active_level_provider(&self) -> Arc<dyn ActiveLevelProvider> {
        self.active_level.clone() as Arc<dyn ActiveLevelProvider>
    }

    /// Current active level.
    pub fn active_level(&self) -> Level {
        self.active_level.active_level()
    }

    /// Whether a pin is set for the current level.
    pub fn is_pin_set(&self) -> bool {
        self.store.is_set(self.active_level())
    }

    /// Whether a duress pin is set one level past the current one.
    pub fn is_duress_pin_set(&self) -> bool {
        self.store.is_set(self.duress_level())
    }

    /// Whether the secure-reset pin is set.
    pub fn is_secure_reset_pin_set(&self) -> bool {
        self.store.is_set(Level::SECURE_RESET)
    }

    /// The duress level relative to the current one; never the sentinel.
    pub fn duress_level(&self) -> Level {
        self.active_level().next_duress()
    }

    /// Uniqueness check against either the duress level or the current
    /// level.
    pub fn is_unique(&self, pin: &str, for_duress: bool) -> bool {
        let level = if for_duress {
            self.duress_level()
        } else {
            self.active_level()
        };
        self.store.is_unique(pin, level)
    }

    /// Set the pin for the current level. Unlocks first if locked.
    pub fn set_pin(&self, pin: &str) -> Result<()> {
        if self.is_locked() {
            self.lock.on_unlock(self.active_level());
        }
        let level = self.active_level();
        self.store.store(pin, level)?;
        self.emit(PinSetEvent::Set(level));
        self.publish_lock_state();
        Ok(())
    }

    /// Set the duress pin one level past the current one.
    pub fn set_duress_pin(&self, pin: &str) -> Result<()> {
        let level = self.duress_level();
        self.store.store(pin, level)?;
        self.emit(PinSetEvent::Set(level));
        self.publish_lock_state();
        Ok(())
    }

    /// Set the secure-reset pin at the reserved sentinel level.
    pub fn set_secure_reset_pin(&self, pin: &str) -> Result<()> {
        self.store.store(pin, Level::SECURE_RESET)?;
        self.emit(PinSetEvent::Set(Level::SECURE_RESET));
        self.publish_lock_state();
        Ok(())
    }

    /// Unlock with a pin.
    ///
    /// Returns `false` for any pin that resolves to no level, with no state
    /// change and no indication of why it failed. Unlock attempts are
    /// serialized: the level and lock mutations of one attempt are never
    /// observable half-applied by another.
    pub async fn unlock(&self, pin: &str) -> bool {
        let _gate = self.unlock_gate.lock().await;

        let level = match self.store.get_level(pin) {
            Some(level) => level,
            None => {
                tracing::debug!("Unlock rejected");
                return false;
            }
        };

        if level.is_secure_reset() {
            return self.secure_reset_unlock().await;
        }

        self.enter_level(level);

        if level.is_duress() {
            tracing::info!(level = %level, "Duress level entered");
            self.alert_sink.on_duress_entered(level);
        }

        true
    }

    /// Secure-reset sequence: wipe, re-arm the entered pin as the new
    /// primary pin, enter level 0. Runs under the unlock gate, so no other
    /// unlock can observe an intermediate state. A failed wipe leaves the
    /// old secure-reset pin active and returns `false`.
    async fn secure_reset_unlock(&self) -> bool {
        if let Err(e) = self.wipe.reset_all_data().await {
            tracing::warn!(error = %e, "Secure reset aborted: wipe failed");
            return false;
        }

        if let Err(e) = self.store.rearm_after_reset() {
            tracing::warn!(error = %e, "Secure reset: failed to re-arm pin");
            return false;
        }

        self.emit(PinSetEvent::Disabled(Level::SECURE_RESET));
        self.emit(PinSetEvent::Set(Level::PRIMARY));
        self.enter_level(Level::PRIMARY);

        tracing::info!("Secure reset completed");
        true
    }

    /// Unlock using the last successfully unlocked level, without a pin.
    pub fn on_biometric_unlock(&self) {
        let level = self.lock.last_unlocked_level();
        self.enter_level(level);
    }

    fn enter_level(&self, level: Level) {
        // Level first: a reader that observes "unlocked" must already see
        // the entered identity, never the one just left.
        self.active_level.set(level);
        self.lock.on_unlock(level);
        self.publish_lock_state();
    }

    /// Clear the pin for the current level.
    pub fn disable_pin(&self) -> Result<()> {
        self.disable_level(self.active_level())
    }

    /// Clear the duress pin.
    pub fn disable_duress_pin(&self) -> Result<()> {
        self.disable_level(self.duress_level())
    }

    /// Clear the secure-reset pin.
    pub fn disable_secure_reset_pin(&self) -> Result<()> {
        self.disable_level(Level::SECURE_RESET)
    }

    fn disable_level(&self, level: Level) -> Result<()> {
        self.store.disable(level)?;
        // Disabling any pin revokes the duress-scoped account allow-list.
        self.policy.revoke_account_filters();
        self.emit(PinSetEvent::Disabled(level));
        self.publish_lock_state();
        Ok(())
    }

    /// Force locked.
    pub fn lock(&self) {
        self.lock.lock();
        self.publish_lock_state();
    }

    /// Keep unlocked across the next foreground transition.
    pub fn keep_unlocked(&self) {
        self.lock.keep_unlocked();
    }

    /// Feed one app-lifecycle event through the lock manager.
    pub fn on_lifecycle_event(&self, event: crate::lifecycle::AppLifecycleEvent) {
        use crate::lifecycle::AppLifecycleEvent::*;
        match event {
            EnterBackground => self.lock.on_enter_background(),
            EnterForeground => self.lock.on_enter_foreground(),
            AllActivitiesDestroyed => self.lock.on_all_activities_destroyed(),
        }
        self.publish_lock_state();
    }

    /// Logical lock state: locked iff the raw flag is locked AND any pin is
    /// set. With no pin set the system is always unlocked.
    pub fn is_locked(&self) -> bool {
        self.lock.state() == crate::lock::LockState::Locked && self.store.is_any_pin_set()
    }

    /// Subscribe to logical lock-state changes.
    pub fn subscribe_locked(&self) -> watch::Receiver<bool> {
        self.is_locked_tx.subscribe()
    }

    /// Subscribe to pin set/disabled events.
    pub fn subscribe_pin_events(&self) -> broadcast::Receiver<PinSetEvent> {
        self.pin_events_tx.subscribe()
    }

    fn publish_lock_state(&self) {
        self.is_locked_tx.send_replace(self.is_locked());
    }

    fn emit(&self, event: PinSetEvent) {
        // Nobody listening is fine
        let _ = self.pin_events_tx.send(event);
    }
}
