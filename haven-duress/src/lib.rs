//! Covert duress-alert dispatcher for Haven Wallet
//!
//! When a duress identity level is entered, this crate covertly sends a
//! small marked transaction to a trusted party. It resolves the per-level
//! notify configuration, builds competing transaction-adapter candidates
//! (one per address-derivation scheme), races them to "synced with
//! sufficient balance", sends from the winner, and tears down every adapter
//! it created — on every code path.
//!
//! The dispatch runs in an application-lifetime task scope: closing the
//! unlock screen cannot cancel it, and its failures never reach the caller
//! that triggered the unlock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod adapter;
pub mod candidate;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod race;
pub mod retry;
pub mod settings;

pub use accounts::AccountRegistry;
pub use adapter::{AdapterRegistry, SyncState, TxAdapter, TxId};
pub use candidate::AdapterCandidate;
pub use config::DispatcherConfig;
pub use dispatcher::{CovertAlertDispatcher, SentAlert};
pub use error::{AdapterError, AdapterResult, DispatchError, DispatchResult};
pub use race::{first_to_satisfy, CandidateVerdict, RaceResult};
pub use settings::{AlertSettings, NotifyConfig};
