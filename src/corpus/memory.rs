/*!
 * In-memory document store.
 */

use std::collections::BTreeMap;

use log::debug;
use parking_lot::RwLock;

use super::{Unit, UnitKey, UnitStore};
use crate::errors::StoreError;
use crate::language_utils::canonical_code;

/// Document store backed by ordered maps
///
/// Texts are keyed by canonical language code, so `fre` and `fr` address the
/// same variant. Reads take a shared lock; ingestion happens before a batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    units: RwLock<BTreeMap<UnitKey, BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from parsed units
    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Self {
        let store = Self::new();
        for unit in units {
            store.insert_unit(unit);
        }
        store
    }

    /// Add or replace one language variant of a unit
    pub fn insert_text(&self, key: UnitKey, language: &str, text: impl Into<String>) {
        let language = language_key(language);
        debug!("Storing {} text for unit {}", language, key);
        self.units
            .write()
            .entry(key)
            .or_default()
            .insert(language, text.into());
    }

    /// Add every language variant of a unit
    pub fn insert_unit(&self, unit: Unit) {
        let key = unit.key();
        for (language, text) in unit.texts {
            self.insert_text(key.clone(), &language, text);
        }
    }

    /// Number of units with at least one text
    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    /// Whether the store holds no units
    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }

    /// Snapshot of all units, ascending by key
    pub fn units(&self) -> Vec<Unit> {
        self.units
            .read()
            .iter()
            .map(|(key, texts)| Unit {
                collection: key.collection.clone(),
                sequence: key.sequence,
                subsequence: key.subsequence,
                texts: texts.clone(),
            })
            .collect()
    }
}

fn language_key(language: &str) -> String {
    canonical_code(language).unwrap_or_else(|_| language.trim().to_lowercase())
}

impl UnitStore for MemoryStore {
    fn unit_text(&self, key: &UnitKey, language: &str) -> Result<Option<String>, StoreError> {
        let language = language_key(language);
        Ok(self
            .units
            .read()
            .get(key)
            .and_then(|texts| texts.get(&language))
            .cloned())
    }

    fn unit_keys(&self, language: &str) -> Result<Vec<UnitKey>, StoreError> {
        let language = language_key(language);
        Ok(self
            .units
            .read()
            .iter()
            .filter(|(_, texts)| texts.contains_key(&language))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn all_unit_keys(&self) -> Result<Vec<UnitKey>, StoreError> {
        Ok(self
            .units
            .read()
            .iter()
            .filter(|(_, texts)| !texts.is_empty())
            .map(|(key, _)| key.clone())
            .collect())
    }
}
