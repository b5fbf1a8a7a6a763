/*!
 * Database entity models.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::corpus::UnitKey;

/// One stored `(unit, language)` text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTextRecord {
    /// Unit the text belongs to
    pub key: UnitKey,
    /// Canonical language code
    pub language: String,
    /// Raw text
    pub text: String,
    /// SHA256 of the text
    pub text_hash: String,
    /// RFC 3339 timestamp of the last change
    pub updated_at: String,
}

/// Outcome of a corpus import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Texts that were not stored before
    pub inserted: usize,
    /// Texts whose content changed
    pub updated: usize,
    /// Texts already stored with identical content
    pub unchanged: usize,
}

impl ImportStats {
    /// Number of texts written
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} unchanged",
            self.inserted, self.updated, self.unchanged
        )
    }
}
