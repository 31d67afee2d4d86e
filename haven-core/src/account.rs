//! Account and wallet references
//!
//! Accounts belong to exactly one identity level. A wallet reference pairs
//! an account with one address-derivation scheme; the covert-alert race
//! considers one candidate adapter per scheme.

use crate::Level;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh account id.
    pub fn new() -> Self {
        AccountId(Uuid::new_v4())
    }

    /// Wrap an existing uuid.
    pub fn from_uuid(id: Uuid) -> Self {
        AccountId(id)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address-derivation scheme for a wallet.
///
/// The chain supports two shielded pools with distinct derivation paths;
/// an account can hold funds under either, so both are raced during a
/// covert alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationScheme {
    /// Sapling-pool derivation
    Sapling,
    /// Orchard-pool derivation
    Orchard,
}

impl DerivationScheme {
    /// All schemes, in race order.
    pub const ALL: [DerivationScheme; 2] = [DerivationScheme::Sapling, DerivationScheme::Orchard];
}

impl fmt::Display for DerivationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationScheme::Sapling => write!(f, "sapling"),
            DerivationScheme::Orchard => write!(f, "orchard"),
        }
    }
}

/// A wallet account bound to one identity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier
    pub id: AccountId,
    /// User-visible name
    pub name: String,
    /// Identity level this account is visible at
    pub level: Level,
}

impl Account {
    /// Create a new account at the given level.
    pub fn new(name: impl Into<String>, level: Level) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            level,
        }
    }

    /// Wallet reference for one derivation scheme of this account.
    pub fn wallet(&self, scheme: DerivationScheme) -> WalletRef {
        WalletRef {
            account_id: self.id,
            scheme,
        }
    }

    /// Wallet references for every derivation scheme, in race order.
    pub fn wallets(&self) -> Vec<WalletRef> {
        DerivationScheme::ALL
            .iter()
            .map(|scheme| self.wallet(*scheme))
            .collect()
    }
}

/// One account under one derivation scheme: the unit the adapter registry
/// keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletRef {
    /// Owning account
    pub account_id: AccountId,
    /// Derivation scheme
    pub scheme: DerivationScheme,
}

impl fmt::Display for WalletRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_id, self.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_wallets_cover_all_schemes() {
        let account = Account::new("Main", Level::PRIMARY);
        let wallets = account.wallets();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].scheme, DerivationScheme::Sapling);
        assert_eq!(wallets[1].scheme, DerivationScheme::Orchard);
        assert!(wallets.iter().all(|w| w.account_id == account.id));
    }

    #[test]
    fn test_account_ids_unique() {
        let a = Account::new("A", Level::PRIMARY);
        let b = Account::new("B", Level::PRIMARY);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_wallet_ref_roundtrip_json() {
        let account = Account::new("Main", Level::PRIMARY);
        let wallet = account.wallet(DerivationScheme::Orchard);
        let json = serde_json::to_string(&wallet).unwrap();
        let back: WalletRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wallet);
    }
}
