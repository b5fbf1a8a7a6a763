/*!
 * Corpus verifier.
 *
 * A claim is checked against its cited unit first. When coverage there is
 * too low, every unit of the language is scored and the best one decides
 * between a mislabeled citation and a quote that is not in the corpus at
 * all. The full scan is O(corpus × signature) per claim: fine for offline
 * audits of a few hundred units, not for request-time use.
 */

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::signature::LexicalSignature;
use super::{ValidationResult, ValidationStatus, VerificationConfig};
use crate::corpus::{UnitKey, UnitStore};
use crate::errors::StoreError;
use crate::text::normalizer::{fold_case, normalize};
use crate::text::profile::LanguageProfile;
use crate::text::segmenter::{Sentence, segment};

/// A unit's text prepared for scoring
#[derive(Debug, Clone)]
struct IndexedUnit {
    normalized: String,
    folded: String,
}

/// Normalized snapshot of every unit in one language
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    profile: LanguageProfile,
    units: BTreeMap<UnitKey, IndexedUnit>,
    /// Units with text in any language
    known: BTreeSet<UnitKey>,
}

impl CorpusIndex {
    /// Read and normalize every unit the store has in the profile's language
    pub fn build<S: UnitStore + ?Sized>(store: &S, profile: &LanguageProfile) -> Result<Self, StoreError> {
        let mut units = BTreeMap::new();
        for key in store.unit_keys(&profile.code)? {
            let Some(raw) = store.unit_text(&key, &profile.code)? else {
                continue;
            };
            let normalized = normalize(&raw, profile);
            let folded = fold_case(&normalized);
            units.insert(key, IndexedUnit { normalized, folded });
        }
        let known = store.all_unit_keys()?.into_iter().collect();
        debug!("Indexed {} '{}' units for verification", units.len(), profile.code);

        Ok(Self {
            profile: profile.clone(),
            units,
            known,
        })
    }

    /// Language of the indexed texts
    pub fn language(&self) -> &str {
        &self.profile.code
    }

    /// Number of indexed units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no unit has text in this language
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether the unit has text in this language
    pub fn contains(&self, key: &UnitKey) -> bool {
        self.units.contains_key(key)
    }

    /// Whether the unit has text in any language
    pub fn knows(&self, key: &UnitKey) -> bool {
        self.units.contains_key(key) || self.known.contains(key)
    }

    /// Best-scoring unit; ties go to the lowest key
    fn best_match(&self, signature: &LexicalSignature) -> Option<(&UnitKey, f64)> {
        let mut best: Option<(&UnitKey, f64)> = None;
        for (key, unit) in &self.units {
            let score = signature.coverage(&unit.folded);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((key, score));
            }
        }
        best
    }

    /// Sentence of the unit best covered by the signature; ties go to the
    /// earliest sentence
    fn snippet(&self, key: &UnitKey, signature: &LexicalSignature, max_chars: usize) -> Option<String> {
        let unit = self.units.get(key)?;
        let mut best: Option<(f64, Sentence)> = None;
        for sentence in segment(&unit.normalized, &self.profile) {
            let folded = fold_case(&sentence.text);
            if signature.first_match(&folded).is_none() {
                continue;
            }
            let score = signature.coverage(&folded);
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((score, sentence));
            }
        }
        let (_, sentence) = best?;

        if sentence.char_len() <= max_chars {
            Some(sentence.text)
        } else {
            let cut: String = sentence.text.chars().take(max_chars).collect();
            Some(format!("{}...", cut.trim_end()))
        }
    }
}

/// Verifies claims against a corpus index
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerificationConfig,
}

impl Verifier {
    /// Create a verifier with the given configuration
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Verify one `(reference, excerpt)` claim in the index's language.
    ///
    /// Every outcome is a value; nothing here fails.
    pub fn verify(&self, reference: &str, excerpt: Option<&str>, index: &CorpusIndex) -> ValidationResult {
        let Some(excerpt) = excerpt.filter(|e| !e.trim().is_empty()) else {
            return ValidationResult::status_only(ValidationStatus::MissingTranslation);
        };

        let Ok(key) = UnitKey::parse(reference) else {
            return ValidationResult::status_only(ValidationStatus::InvalidReference);
        };

        let Some(unit) = index.units.get(&key) else {
            let status = if index.knows(&key) {
                ValidationStatus::MissingTranslation
            } else {
                ValidationStatus::SessionNotFound
            };
            debug!("{}: no '{}' text ({})", key, index.language(), status);
            return ValidationResult::status_only(status);
        };

        let signature = LexicalSignature::new(&normalize(excerpt, &index.profile), &self.config);
        let coverage = signature.coverage(&unit.folded);
        if coverage >= self.config.coverage_threshold {
            debug!("{}: valid (coverage {:.2})", key, coverage);
            let snippet = index.snippet(&key, &signature, self.config.snippet_chars);
            return ValidationResult::valid(coverage, snippet);
        }

        match index.best_match(&signature) {
            Some((best_key, score)) if score >= self.config.coverage_threshold && *best_key != key => {
                debug!("{}: found under {} instead (coverage {:.2})", key, best_key, score);
                let snippet = index.snippet(best_key, &signature, self.config.snippet_chars);
                ValidationResult::wrong_reference(best_key.clone(), coverage, snippet)
            }
            _ => {
                debug!("{}: quote not found (coverage {:.2})", key, coverage);
                ValidationResult::quote_not_found(coverage)
            }
        }
    }
}
