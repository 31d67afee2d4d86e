//! Haven Wallet shared domain types
//!
//! This crate defines the identity-level model (primary, duress and
//! secure-reset levels), account/wallet references used by the adapter
//! registry, and the bounded alert memo format.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod error;
pub mod level;
pub mod memo;

pub use account::{Account, AccountId, DerivationScheme, WalletRef};
pub use error::{Error, Result};
pub use level::Level;
pub use memo::{Memo, MAX_MEMO_LENGTH};
