//! PIN hashing with Argon2id
//!
//! Pins are short numeric secrets, so they get lighter Argon2id parameters
//! than a full passphrase while still resisting offline guessing.
//! The PHC hash string carries salt and parameters for verification.

use crate::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use zeroize::Zeroizing;

/// A hashed PIN stored as an Argon2id PHC string.
pub struct PinHash {
    hash: String,
}

impl PinHash {
    /// Argon2id parameters for PIN hashing
    /// Memory: 16 MiB, Iterations: 2, Parallelism: 2
    const ARGON2_PARAMS: (u32, u32, u32) = (16384, 2, 2);

    /// Minimum PIN length in digits
    pub const MIN_PIN_LENGTH: usize = 4;

    /// Maximum PIN length in digits
    pub const MAX_PIN_LENGTH: usize = 12;

    /// Validate PIN format.
    pub fn validate(pin: &str) -> Result<()> {
        if pin.len() < Self::MIN_PIN_LENGTH || pin.len() > Self::MAX_PIN_LENGTH {
            return Err(Error::InvalidPin(format!(
                "PIN must be {}-{} digits",
                Self::MIN_PIN_LENGTH,
                Self::MAX_PIN_LENGTH
            )));
        }

        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidPin("PIN must contain only digits".to_string()));
        }

        Ok(())
    }

    /// Hash a PIN (validates format first).
    pub fn hash(pin: &str) -> Result<Self> {
        Self::validate(pin)?;

        let pin = Zeroizing::new(pin.to_string());
        let salt = SaltString::generate(&mut OsRng);

        let params = ParamsBuilder::new()
            .m_cost(Self::ARGON2_PARAMS.0)
            .t_cost(Self::ARGON2_PARAMS.1)
            .p_cost(Self::ARGON2_PARAMS.2)
            .build()
            .map_err(|e| Error::Hash(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| Error::Hash(e.to_string()))?
            .to_string();

        Ok(Self { hash })
    }

    /// Verify a PIN against this hash.
    pub fn verify(&self, pin: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(&self.hash).map_err(|e| Error::Hash(e.to_string()))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(pin.as_bytes(), &parsed_hash).is_ok())
    }

    /// Get hash string for storage.
    pub fn hash_string(&self) -> &str {
        &self.hash
    }

    /// Load from stored hash.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_hashing() {
        let pin = PinHash::hash("1234").unwrap();
        assert!(pin.verify("1234").unwrap());
        assert!(!pin.verify("5678").unwrap());
    }

    #[test]
    fn test_pin_validation() {
        // Too short
        assert!(PinHash::hash("123").is_err());

        // Too long
        assert!(PinHash::hash("1234567890123").is_err());

        // Non-numeric
        assert!(PinHash::hash("12ab").is_err());

        // Valid
        assert!(PinHash::hash("1234").is_ok());
        assert!(PinHash::hash("123456789012").is_ok());
    }

    #[test]
    fn test_hash_roundtrip_through_storage() {
        let pin = PinHash::hash("4321").unwrap();
        let stored = pin.hash_string().to_string();

        let loaded = PinHash::from_hash(stored);
        assert!(loaded.verify("4321").unwrap());
        assert!(!loaded.verify("1234").unwrap());
    }

    #[test]
    fn test_same_pin_different_salts() {
        let a = PinHash::hash("9999").unwrap();
        let b = PinHash::hash("9999").unwrap();
        assert_ne!(a.hash_string(), b.hash_string());
    }
}
