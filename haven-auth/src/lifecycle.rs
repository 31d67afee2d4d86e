//! App lifecycle event consumption
//!
//! Lifecycle signals from the host platform are delivered over a channel
//! and consumed by exactly one loop, in order. That single consumer is what
//! guarantees lock-state transitions never interleave.

use crate::component::PinComponent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// App lifecycle transitions relevant to locking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleEvent {
    /// App moved to the foreground
    EnterForeground,
    /// App moved to the background
    EnterBackground,
    /// All activities destroyed; process likely being killed
    AllActivitiesDestroyed,
}

/// Spawn the single lifecycle consumer.
///
/// The loop ends when the sender side is dropped.
pub fn spawn_lifecycle_loop(
    component: Arc<PinComponent>,
    mut events: mpsc::Receiver<AppLifecycleEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!(?event, "Lifecycle event");
            component.on_lifecycle_event(event);
        }
        tracing::debug!("Lifecycle event stream ended");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{DuressAlertSink, DuressPolicy, SecureWipe};
    use crate::lock::{LockManager, MemoryLastExitStore};
    use crate::pin_store::PinLevelStore;
    use crate::storage::MemoryPinStorage;
    use crate::Result;
    use haven_core::Level;

    struct NoopWipe;

    #[async_trait::async_trait]
    impl SecureWipe for NoopWipe {
        async fn reset_all_data(&self) -> Result<()> {
            Ok(())
        }
    }

    struct NoopPolicy;

    impl DuressPolicy for NoopPolicy {
        fn revoke_account_filters(&self) {}
    }

    struct NoopSink;

    impl DuressAlertSink for NoopSink {
        fn on_duress_entered(&self, _entered: Level) {}
    }

    #[tokio::test]
    async fn test_events_consumed_in_order() {
        let store = Arc::new(PinLevelStore::new(Arc::new(MemoryPinStorage::new())).unwrap());
        let lock = Arc::new(LockManager::new(Arc::new(MemoryLastExitStore::new())));
        let component = Arc::new(PinComponent::new(
            store,
            lock,
            Arc::new(NoopWipe),
            Arc::new(NoopPolicy),
            Arc::new(NoopSink),
        ));
        component.set_pin("1234").unwrap();
        assert!(component.unlock("1234").await);

        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_lifecycle_loop(component.clone(), rx);

        tx.send(AppLifecycleEvent::EnterBackground).await.unwrap();
        tx.send(AppLifecycleEvent::EnterForeground).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        // Foreground after background re-locks
        assert!(component.is_locked());
    }
}
