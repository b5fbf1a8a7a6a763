/*!
 * Corpus access: unit keys and the document store contract.
 *
 * The engine only ever reads from a store, one `(unit, language)` text at a
 * time. Language variants arrive independently, so a unit may exist in one
 * language and not yet in another.
 *
 * - `memory`: in-memory store, the default for batch runs
 * - `loader`: JSON corpus files
 *
 * A SQLite-backed store lives in `crate::database`.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ReferenceError, StoreError};

pub mod loader;
pub mod memory;

pub use loader::{CorpusFile, load_corpus};
pub use memory::MemoryStore;

static RE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([A-Za-z0-9_-]+):)?(\d+)\.(\d+)$").expect("valid reference regex")
});

/// Composite key of a unit: collection, sequence and subsequence
/// (e.g. session 17, question 2)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    /// Collection name; empty for the primary collection
    pub collection: String,
    /// Sequence number, starting at 1
    pub sequence: u32,
    /// Subsequence number, starting at 0
    pub subsequence: u32,
}

impl UnitKey {
    /// Key in the primary collection
    pub fn new(sequence: u32, subsequence: u32) -> Self {
        Self {
            collection: String::new(),
            sequence,
            subsequence,
        }
    }

    /// Key in a named collection
    pub fn in_collection(collection: impl Into<String>, sequence: u32, subsequence: u32) -> Self {
        Self {
            collection: collection.into(),
            sequence,
            subsequence,
        }
    }

    /// Parse a `[collection:]sequence.subsequence` reference
    pub fn parse(reference: &str) -> Result<Self, ReferenceError> {
        let trimmed = reference.trim();
        let captures = RE_REFERENCE
            .captures(trimmed)
            .ok_or_else(|| ReferenceError::Malformed(reference.to_string()))?;

        let number = |index: usize| -> Result<u32, ReferenceError> {
            captures
                .get(index)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .parse::<u32>()
                .map_err(|_| ReferenceError::OutOfRange(reference.to_string()))
        };

        let sequence = number(2)?;
        let subsequence = number(3)?;
        if sequence == 0 {
            return Err(ReferenceError::OutOfRange(reference.to_string()));
        }

        let collection = captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Ok(Self {
            collection,
            sequence,
            subsequence,
        })
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collection.is_empty() {
            write!(f, "{}.{}", self.sequence, self.subsequence)
        } else {
            write!(f, "{}:{}.{}", self.collection, self.sequence, self.subsequence)
        }
    }
}

impl FromStr for UnitKey {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UnitKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One unit with every language variant known so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Collection name; empty for the primary collection
    #[serde(default)]
    pub collection: String,
    /// Sequence number
    pub sequence: u32,
    /// Subsequence number
    pub subsequence: u32,
    /// Raw text per language code
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
}

impl Unit {
    /// Key of this unit
    pub fn key(&self) -> UnitKey {
        UnitKey::in_collection(self.collection.clone(), self.sequence, self.subsequence)
    }
}

/// Read-only document store consumed by the engine.
///
/// Implementations must be deterministic for a given key and language at a
/// given point in time. Errors mean the store itself is broken; a missing
/// text is `Ok(None)`.
pub trait UnitStore: Send + Sync {
    /// Full raw text of a unit in a language
    fn unit_text(&self, key: &UnitKey, language: &str) -> Result<Option<String>, StoreError>;

    /// Keys of every unit that has text in the language, ascending
    fn unit_keys(&self, language: &str) -> Result<Vec<UnitKey>, StoreError>;

    /// Keys of every unit that has text in any language, ascending
    fn all_unit_keys(&self) -> Result<Vec<UnitKey>, StoreError>;
}

impl<S: UnitStore + ?Sized> UnitStore for std::sync::Arc<S> {
    fn unit_text(&self, key: &UnitKey, language: &str) -> Result<Option<String>, StoreError> {
        (**self).unit_text(key, language)
    }

    fn unit_keys(&self, language: &str) -> Result<Vec<UnitKey>, StoreError> {
        (**self).unit_keys(language)
    }

    fn all_unit_keys(&self) -> Result<Vec<UnitKey>, StoreError> {
        (**self).all_unit_keys()
    }
}
