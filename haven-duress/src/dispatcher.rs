//! Covert alert dispatcher
//!
//! Entering a duress level fires a detached dispatch task that sends a
//! small marked transaction to the trusted party configured for the level
//! just below the one entered. The task resolves the notify config, builds
//! one adapter candidate per derivation scheme (borrowing running adapters
//! where the host registry has them, constructing its own otherwise),
//! races the candidates to "synced with sufficient balance", sends from
//! the winner, and tears every owned adapter down afterwards.
//!
//! Dispatch failures are logged here and never reach the unlock flow that
//! triggered them; the unlock must look identical whether or not an alert
//! went out.

use crate::accounts::AccountRegistry;
use crate::adapter::{AdapterRegistry, TxAdapter, TxId};
use crate::candidate::AdapterCandidate;
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::race::{first_to_satisfy, CandidateVerdict, RaceResult};
use crate::retry;
use crate::settings::{AlertSettings, NotifyConfig};
use crate::AdapterError;
use haven_auth::DuressAlertSink;
use haven_core::{Account, Level, Memo, WalletRef};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A successfully sent covert alert.
#[derive(Debug, Clone)]
pub struct SentAlert {
    /// Wallet the alert was paid from
    pub wallet: WalletRef,
    /// Transaction id of the alert
    pub txid: TxId,
    /// Amount sent, in base units
    pub amount: u64,
}

/// Dispatches covert duress alerts.
///
/// Cheap to clone; clones share the same collaborators and config.
#[derive(Clone)]
pub struct CovertAlertDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    accounts: Arc<dyn AccountRegistry>,
    adapters: Arc<dyn AdapterRegistry>,
    settings: Arc<dyn AlertSettings>,
    config: DispatcherConfig,
    runtime: tokio::runtime::Handle,
}

impl CovertAlertDispatcher {
    /// Create a dispatcher. `runtime` is the application-lifetime runtime
    /// that detached dispatch tasks run on.
    pub fn new(
        accounts: Arc<dyn AccountRegistry>,
        adapters: Arc<dyn AdapterRegistry>,
        settings: Arc<dyn AlertSettings>,
        config: DispatcherConfig,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                accounts,
                adapters,
                settings,
                config,
                runtime,
            }),
        }
    }

    /// Run one dispatch for a freshly entered level.
    ///
    /// Returns `Ok(None)` when nothing should be sent: the level is not a
    /// duress level, or the level below it has no complete notify config.
    pub async fn dispatch(&self, entered: Level) -> DispatchResult<Option<SentAlert>> {
        if !entered.is_duress() {
            return Ok(None);
        }

        let configured_at = entered.previous();
        let config = match self.inner.settings.notify_config(configured_at) {
            Some(config) if config.is_complete() => config,
            Some(_) => {
                tracing::debug!(level = %configured_at, "Notify config incomplete, skipping alert");
                return Ok(None);
            }
            None => {
                tracing::debug!(level = %configured_at, "No notify config, skipping alert");
                return Ok(None);
            }
        };

        let memo = Memo::from_text_truncated(config.memo.clone());
        let alert = self
            .run_attempt(&config, &memo, self.inner.config.alert_amount)
            .await?;
        Ok(Some(alert))
    }

    /// Send a real alert now, outside any unlock, so the user can verify
    /// their configuration end to end.
    pub async fn send_test_alert(&self, config: &NotifyConfig) -> DispatchResult<SentAlert> {
        let memo = Memo::from_text_truncated(config.memo.clone());
        self.run_attempt(config, &memo, self.inner.config.alert_amount)
            .await
    }

    async fn run_attempt(
        &self,
        config: &NotifyConfig,
        memo: &Memo,
        amount: u64,
    ) -> DispatchResult<SentAlert> {
        let account = self
            .inner
            .accounts
            .account(&config.account_id)
            .ok_or(DispatchError::WalletNotFound)?;

        let is_active = self
            .inner
            .accounts
            .active_account()
            .map(|active| active.id == account.id)
            .unwrap_or(false);

        let candidates = self.resolve_candidates(&account, is_active).await?;

        let outcome = self
            .race_and_send(&candidates, &config.address, memo, amount)
            .await;

        for candidate in &candidates {
            candidate.teardown().await;
        }

        outcome
    }

    /// One candidate per derivation scheme. Running adapters are borrowed
    /// from the registry; missing ones are constructed and started here in
    /// parallel, each with bounded retries while its identity tag is busy.
    async fn resolve_candidates(
        &self,
        account: &Account,
        is_active: bool,
    ) -> DispatchResult<Vec<AdapterCandidate>> {
        let mut candidates = Vec::new();
        let mut missing = Vec::new();

        for wallet in account.wallets() {
            let existing = if is_active {
                self.inner
                    .adapters
                    .await_running_adapter(&wallet, self.inner.config.adapter_await_timeout)
                    .await
            } else {
                self.inner.adapters.running_adapter(&wallet)
            };

            match existing {
                Some(adapter) => {
                    tracing::debug!(scheme = %wallet.scheme, "Using running adapter");
                    candidates.push(AdapterCandidate::borrowed(wallet, adapter));
                }
                None => missing.push(wallet),
            }
        }

        let mut constructions = JoinSet::new();
        for wallet in missing {
            let adapters = Arc::clone(&self.inner.adapters);
            let attempts = self.inner.config.create_attempts;
            let backoff = self.inner.config.create_backoff;
            constructions.spawn(async move {
                let created = retry::with_backoff(
                    attempts,
                    backoff,
                    move || {
                        let adapters = Arc::clone(&adapters);
                        async move { adapters.create_adapter(&wallet).await }
                    },
                    AdapterError::is_retryable,
                )
                .await;
                (wallet, Self::start_created(wallet, created).await)
            });
        }

        while let Some(joined) = constructions.join_next().await {
            match joined {
                Ok((wallet, Some(adapter))) => {
                    candidates.push(AdapterCandidate::owned(wallet, adapter));
                }
                Ok((_, None)) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Adapter construction task failed");
                }
            }
        }

        if candidates.is_empty() {
            return Err(DispatchError::AdapterCreationFailed);
        }
        Ok(candidates)
    }

    async fn start_created(
        wallet: WalletRef,
        created: Result<Arc<dyn TxAdapter>, AdapterError>,
    ) -> Option<Arc<dyn TxAdapter>> {
        let adapter = match created {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::warn!(scheme = %wallet.scheme, error = %e, "Adapter construction failed");
                return None;
            }
        };
        if let Err(e) = adapter.start().await {
            tracing::warn!(scheme = %wallet.scheme, error = %e, "Adapter failed to start");
            if let Err(stop_err) = adapter.stop().await {
                tracing::warn!(scheme = %wallet.scheme, error = %stop_err, "Failed to stop unstarted adapter");
            }
            return None;
        }
        Some(adapter)
    }

    async fn race_and_send(
        &self,
        candidates: &[AdapterCandidate],
        address: &str,
        memo: &Memo,
        amount: u64,
    ) -> DispatchResult<SentAlert> {
        let races = candidates
            .iter()
            .map(|candidate| candidate.readiness_future(amount, self.inner.config.sync_timeout))
            .collect();

        match first_to_satisfy(races).await {
            RaceResult::Winner(index) => {
                let winner = &candidates[index];
                tracing::debug!(scheme = %winner.wallet.scheme, "Candidate won readiness race");
                let txid = winner
                    .adapter
                    .send(amount, address, memo)
                    .await
                    .map_err(|e| DispatchError::TransactionFailed(e.to_string()))?;
                Ok(SentAlert {
                    wallet: winner.wallet,
                    txid,
                    amount,
                })
            }
            RaceResult::NoWinner(verdicts) => {
                let all_insufficient = !verdicts.is_empty()
                    && verdicts
                        .iter()
                        .all(|(_, verdict)| *verdict == CandidateVerdict::SyncedInsufficient);
                if all_insufficient {
                    Err(DispatchError::InsufficientBalance)
                } else {
                    Err(DispatchError::Timeout)
                }
            }
        }
    }
}

impl DuressAlertSink for CovertAlertDispatcher {
    /// Fire-and-forget: spawns the dispatch on the application runtime and
    /// returns immediately. The unlock that entered the level never waits
    /// on, or learns about, the alert.
    fn on_duress_entered(&self, entered: Level) {
        let dispatcher = self.clone();
        self.inner.runtime.spawn(async move {
            match dispatcher.dispatch(entered).await {
                Ok(Some(alert)) => {
                    tracing::info!(
                        wallet = %alert.wallet,
                        txid = %alert.txid,
                        "Covert alert sent"
                    );
                }
                Ok(None) => {
                    tracing::debug!(level = %entered, "No covert alert configured for this level");
                }
                Err(e) => {
                    tracing::warn!(level = %entered, error = %e, "Covert alert dispatch failed");
                }
            }
        });
    }
}
