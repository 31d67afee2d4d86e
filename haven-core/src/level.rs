//! Identity levels
//!
//! Each PIN unlocks one level. Level 0 is the primary identity, positive
//! levels are duress/decoy identities by increasing depth, and a reserved
//! sentinel level arms the secure-reset pin. The sentinel never appears in
//! normal level enumeration or duress derivation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identity level unlocked by a distinct PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Level(i32);

impl Level {
    /// Primary identity.
    pub const PRIMARY: Level = Level(0);

    /// Reserved sentinel level whose pin triggers a full data wipe.
    ///
    /// The value is reserved forever: duress derivation and decoy level
    /// assignment both skip it.
    pub const SECURE_RESET: Level = Level(255);

    /// Create a level from a raw value.
    ///
    /// Negative values are rejected; the sentinel is allowed so stored
    /// records can round-trip.
    pub fn new(value: i32) -> Result<Self> {
        if value < 0 {
            return Err(Error::InvalidLevel(format!(
                "Level must be non-negative, got {}",
                value
            )));
        }
        Ok(Level(value))
    }

    /// Raw level value.
    pub fn value(&self) -> i32 {
        self.0
    }

    /// True for any coercion-entered (decoy) level.
    pub fn is_duress(&self) -> bool {
        self.0 > 0 && *self != Self::SECURE_RESET
    }

    /// True for the reserved secure-reset sentinel.
    pub fn is_secure_reset(&self) -> bool {
        *self == Self::SECURE_RESET
    }

    /// The duress level one step past this one, skipping the sentinel.
    pub fn next_duress(&self) -> Level {
        let mut next = Level(self.0.saturating_add(1));
        if next == Self::SECURE_RESET {
            next = Level(next.0.saturating_add(1));
        }
        next
    }

    /// The level just left when this duress level was entered, skipping the
    /// reserved sentinel on the way down. Inverse of [`Level::next_duress`]
    /// for every non-sentinel level.
    ///
    /// Only meaningful for duress levels; the primary level returns itself.
    pub fn previous(&self) -> Level {
        let mut prev = Level(self.0.saturating_sub(1).max(0));
        if prev == Self::SECURE_RESET {
            prev = Level(prev.0 - 1);
        }
        prev
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_secure_reset() {
            write!(f, "secure-reset")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_primary_is_not_duress() {
        assert!(!Level::PRIMARY.is_duress());
        assert!(!Level::PRIMARY.is_secure_reset());
    }

    #[test]
    fn test_sentinel_is_not_duress() {
        assert!(Level::SECURE_RESET.is_secure_reset());
        assert!(!Level::SECURE_RESET.is_duress());
    }

    #[test]
    fn test_negative_level_rejected() {
        assert!(Level::new(-1).is_err());
        assert!(Level::new(0).is_ok());
        assert!(Level::new(3).is_ok());
    }

    #[test]
    fn test_next_duress_from_primary() {
        assert_eq!(Level::PRIMARY.next_duress(), Level::new(1).unwrap());
    }

    #[test]
    fn test_next_duress_skips_sentinel() {
        let below = Level::new(Level::SECURE_RESET.value() - 1).unwrap();
        let next = below.next_duress();
        assert!(!next.is_secure_reset());
        assert_eq!(next.value(), Level::SECURE_RESET.value() + 1);
    }

    #[test]
    fn test_previous_of_duress() {
        assert_eq!(Level::new(1).unwrap().previous(), Level::PRIMARY);
        assert_eq!(Level::new(3).unwrap().previous(), Level::new(2).unwrap());
        assert_eq!(Level::PRIMARY.previous(), Level::PRIMARY);
    }

    #[test]
    fn test_previous_skips_sentinel() {
        let above = Level::new(Level::SECURE_RESET.value() + 1).unwrap();
        assert!(!above.previous().is_secure_reset());
        assert_eq!(above.previous().value(), Level::SECURE_RESET.value() - 1);

        // The level derived just past the sentinel maps back to the level
        // it was derived from
        let deepest = Level::new(Level::SECURE_RESET.value() - 1).unwrap();
        assert_eq!(deepest.next_duress().previous(), deepest);
    }

    proptest! {
        #[test]
        fn prop_next_duress_never_sentinel(v in 0i32..1_000_000) {
            let level = Level::new(v).unwrap();
            prop_assert!(!level.next_duress().is_secure_reset());
        }

        #[test]
        fn prop_next_duress_is_deeper(v in 0i32..1_000_000) {
            let level = Level::new(v).unwrap();
            prop_assert!(level.next_duress().value() > level.value());
        }

        #[test]
        fn prop_previous_inverts_next_duress(v in 0i32..1_000_000) {
            prop_assume!(v != Level::SECURE_RESET.value());
            let level = Level::new(v).unwrap();
            prop_assert_eq!(level.next_duress().previous(), level);
        }
    }
}
