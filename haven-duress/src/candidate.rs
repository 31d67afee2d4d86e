//! Adapter candidates
//!
//! One candidate per address-derivation scheme of the target account.
//! A candidate either borrows an adapter that the host registry was
//! already running, or owns one that this crate constructed for the
//! attempt. Teardown stops owned adapters only; borrowed ones belong to
//! the registry and keep running after the dispatch finishes.

use crate::adapter::{SyncState, TxAdapter};
use crate::race::CandidateVerdict;
use haven_core::WalletRef;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One adapter racing to become send-ready.
pub struct AdapterCandidate {
    /// Wallet this candidate sends from
    pub wallet: WalletRef,
    /// The adapter itself
    pub adapter: Arc<dyn TxAdapter>,
    owned: bool,
}

impl AdapterCandidate {
    /// Candidate over an adapter the host registry already runs.
    pub fn borrowed(wallet: WalletRef, adapter: Arc<dyn TxAdapter>) -> Self {
        Self {
            wallet,
            adapter,
            owned: false,
        }
    }

    /// Candidate over an adapter constructed for this attempt.
    pub fn owned(wallet: WalletRef, adapter: Arc<dyn TxAdapter>) -> Self {
        Self {
            wallet,
            adapter,
            owned: true,
        }
    }

    /// Whether teardown must stop this candidate's adapter.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Future that resolves once this candidate's wait is decided: synced
    /// with at least `min_balance` spendable, synced but short, failed, or
    /// timed out after `sync_timeout`.
    pub fn readiness_future(
        &self,
        min_balance: u64,
        sync_timeout: Duration,
    ) -> impl Future<Output = CandidateVerdict> + Send + 'static {
        let adapter = Arc::clone(&self.adapter);
        async move {
            let wait = async {
                let mut states = adapter.sync_state();
                loop {
                    let state = states.borrow_and_update().clone();
                    match state {
                        SyncState::Synced => {
                            let balance = adapter.available_balance();
                            if balance >= min_balance {
                                return CandidateVerdict::Ready;
                            }
                            tracing::debug!(
                                balance,
                                min_balance,
                                "Candidate synced with insufficient balance"
                            );
                            return CandidateVerdict::SyncedInsufficient;
                        }
                        SyncState::NotSynced(reason) => {
                            return CandidateVerdict::Failed(reason);
                        }
                        SyncState::Connecting | SyncState::Syncing => {}
                    }
                    if states.changed().await.is_err() {
                        return CandidateVerdict::Failed("Sync state stream ended".to_string());
                    }
                }
            };

            match tokio::time::timeout(sync_timeout, wait).await {
                Ok(verdict) => verdict,
                Err(_) => CandidateVerdict::TimedOut,
            }
        }
    }

    /// Stop the adapter if this candidate owns it. Failures are logged and
    /// swallowed; teardown runs on every dispatch path.
    pub async fn teardown(&self) {
        if !self.owned {
            return;
        }
        if let Err(e) = self.adapter.stop().await {
            tracing::warn!(
                scheme = ?self.wallet.scheme,
                error = %e,
                "Failed to stop owned adapter during teardown"
            );
        }
    }
}
