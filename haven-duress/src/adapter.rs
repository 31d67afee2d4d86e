//! Transaction adapter contract
//!
//! The dispatcher depends on a narrow slice of what chain adapters can do:
//! start/stop, a sync-state stream, an available balance, and send. The
//! registry is shared with the rest of the wallet; adapters obtained from
//! `running_adapter`/`await_running_adapter` are borrowed and must not be
//! stopped by this crate, while adapters from `create_adapter` are owned by
//! the attempt that created them.

use crate::error::AdapterResult;
use haven_core::{Memo, WalletRef};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Adapter sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// Connecting to the network
    Connecting,
    /// Catching up with the chain
    Syncing,
    /// Balance data is authoritative and the adapter is send-ready
    Synced,
    /// Sync failed
    NotSynced(String),
}

/// Transaction identifier returned by a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The adapter surface the dispatcher races and sends through.
#[async_trait::async_trait]
pub trait TxAdapter: Send + Sync {
    /// Start syncing. Only called on adapters this crate created.
    async fn start(&self) -> AdapterResult<()>;

    /// Stop and release resources. Only called on adapters this crate
    /// created.
    async fn stop(&self) -> AdapterResult<()>;

    /// Sync-state stream; the receiver always observes the latest state.
    fn sync_state(&self) -> watch::Receiver<SyncState>;

    /// Spendable balance in base units, authoritative once `Synced`.
    fn available_balance(&self) -> u64;

    /// Send a transaction.
    async fn send(&self, amount: u64, address: &str, memo: &Memo) -> AdapterResult<TxId>;
}

/// Host adapter registry shared with the rest of the wallet.
#[async_trait::async_trait]
pub trait AdapterRegistry: Send + Sync {
    /// An already-running adapter for this wallet, if any. Never blocks.
    fn running_adapter(&self, wallet: &WalletRef) -> Option<Arc<dyn TxAdapter>>;

    /// Wait up to `timeout` for the registry to produce a running adapter
    /// (it may still be starting up for the active account).
    async fn await_running_adapter(
        &self,
        wallet: &WalletRef,
        timeout: Duration,
    ) -> Option<Arc<dyn TxAdapter>>;

    /// Construct a new adapter for this wallet. May fail with
    /// [`crate::AdapterError::Busy`] while a previous session with the same
    /// identity tag is still shutting down.
    async fn create_adapter(&self, wallet: &WalletRef) -> AdapterResult<Arc<dyn TxAdapter>>;
}
