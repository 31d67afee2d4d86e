//! PIN-to-level mapping
//!
//! Each stored PIN unlocks exactly one level. Lookups are total: a pin that
//! matches nothing resolves to `None`, never an error, so a caller cannot
//! distinguish an unset level from a mismatch. Every stored record is
//! verified on every lookup, including after a match is found.

use crate::hash::PinHash;
use crate::storage::{PinRecord, PinStorage};
use crate::{Error, Result};
use haven_core::Level;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Durable mapping of PIN to identity level.
pub struct PinLevelStore {
    records: RwLock<HashMap<Level, PinRecord>>,
    storage: Arc<dyn PinStorage>,
}

impl PinLevelStore {
    /// Create the store, loading existing records from storage.
    pub fn new(storage: Arc<dyn PinStorage>) -> Result<Self> {
        let records = storage
            .load_all()?
            .into_iter()
            .map(|r| (r.level, r))
            .collect();

        Ok(Self {
            records: RwLock::new(records),
            storage,
        })
    }

    /// Persist a pin for a level, overwriting any pin already at that level.
    ///
    /// Rejected before persistence if another level already holds the same
    /// pin.
    pub fn store(&self, pin: &str, level: Level) -> Result<()> {
        if !self.is_unique(pin, level) {
            return Err(Error::PinNotUnique);
        }

        let hash = PinHash::hash(pin)?;
        let record = PinRecord {
            level,
            hash: hash.hash_string().to_string(),
        };

        self.storage.upsert(&record)?;
        self.records.write().insert(level, record);

        tracing::info!(level = %level, "Pin stored");
        Ok(())
    }

    /// True iff no *other* level currently holds this pin.
    ///
    /// Every record is checked; verification failures count as non-matches.
    pub fn is_unique(&self, pin: &str, level: Level) -> bool {
        let records = self.records.read();
        let mut clash = false;
        for (other, record) in records.iter() {
            let matches = PinHash::from_hash(record.hash.clone())
                .verify(pin)
                .unwrap_or(false);
            clash |= matches && *other != level;
        }
        !clash
    }

    /// Resolve the level for an entered pin, if any.
    pub fn get_level(&self, pin: &str) -> Option<Level> {
        let records = self.records.read();
        let mut resolved = None;
        for (level, record) in records.iter() {
            let matches = PinHash::from_hash(record.hash.clone())
                .verify(pin)
                .unwrap_or(false);
            if matches && resolved.is_none() {
                resolved = Some(*level);
            }
        }
        resolved
    }

    /// Clear the stored pin for a level; other levels are not renumbered.
    pub fn disable(&self, level: Level) -> Result<()> {
        self.storage.delete(level)?;
        self.records.write().remove(&level);

        tracing::info!(level = %level, "Pin disabled");
        Ok(())
    }

    /// Whether a pin is set for this level.
    pub fn is_set(&self, level: Level) -> bool {
        self.records.read().contains_key(&level)
    }

    /// Whether any pin is set at all.
    pub fn is_any_pin_set(&self) -> bool {
        !self.records.read().is_empty()
    }

    /// Smallest unused positive level, skipping the secure-reset sentinel.
    pub fn next_decoy_level(&self) -> Level {
        let records = self.records.read();
        let mut candidate = 1i32;
        loop {
            let level = Level::new(candidate).expect("positive level");
            if !level.is_secure_reset() && !records.contains_key(&level) {
                return level;
            }
            candidate += 1;
        }
    }

    /// Move the sentinel record to level 0, keeping the same hash.
    ///
    /// Used by the secure-reset unlock: the entered pin becomes the new
    /// primary pin in one step, so no intermediate state is observable where
    /// the pin resolves to nothing.
    pub fn rearm_after_reset(&self) -> Result<()> {
        let mut records = self.records.write();

        let sentinel = records
            .remove(&Level::SECURE_RESET)
            .ok_or_else(|| Error::Storage("No secure-reset pin to re-arm".to_string()))?;

        let primary = PinRecord {
            level: Level::PRIMARY,
            hash: sentinel.hash,
        };

        self.storage.delete(Level::SECURE_RESET)?;
        self.storage.upsert(&primary)?;
        records.insert(Level::PRIMARY, primary);

        tracing::info!("Secure-reset pin re-armed as primary");
        Ok(())
    }
}
