//! Multi-level PIN authentication for Haven Wallet
//!
//! Implements the PIN-level state machine: different PINs unlock different
//! identity levels (primary, duress/decoy tiers, and a reserved secure-reset
//! level), with an app-lifecycle-driven lock manager and a component that
//! orchestrates unlock, level tracking, and the duress-alert handoff.
//!
//! ## Security Features
//!
//! - **PIN Hashing**: Argon2id PHC strings, pins zeroized in memory
//! - **Level Uniqueness**: a PIN can be assigned to at most one level
//! - **Uniform Failure**: wrong pin is reported identically for unset,
//!   mismatched, and disabled levels
//! - **Secure Reset**: the sentinel pin wipes all data and re-arms itself
//!   as the new primary pin in one observable step

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod active_level;
pub mod component;
pub mod error;
pub mod hash;
pub mod lifecycle;
pub mod lock;
pub mod pin_store;
pub mod storage;

pub use active_level::{ActiveLevelCell, ActiveLevelProvider};
pub use component::{DuressAlertSink, DuressPolicy, PinComponent, PinSetEvent, SecureWipe};
pub use error::{Error, Result};
pub use hash::PinHash;
pub use lifecycle::{spawn_lifecycle_loop, AppLifecycleEvent};
pub use lock::{LockManager, LockState, MemoryLastExitStore};
pub use pin_store::PinLevelStore;
pub use storage::{MemoryPinStorage, PinRecord, PinStorage, SqlitePinStorage};
