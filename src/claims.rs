/*!
 * Excerpt claims and their write-back.
 *
 * A claim is a quote cited somewhere in the content (a glossary entry, a
 * lesson step): a unit reference plus the excerpt in every language known so
 * far. The engine only reads claims. Everything that changes them lives
 * here and runs after a batch has finished, never while one is reading.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentResult;
use crate::language_utils::{canonical_code, language_codes_match};
use crate::validation::{ValidationResult, ValidationStatus};

/// One cited excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcerptClaim {
    /// Identifier within the citing content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unit reference as written, `[collection:]sequence.subsequence`
    pub reference: String,

    /// Excerpt text per language code
    #[serde(default)]
    pub excerpts: BTreeMap<String, String>,

    /// The excerpt comes from an uninterrupted opening monologue
    #[serde(default)]
    pub monologue: bool,

    /// Languages whose excerpt was machine generated rather than aligned
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub generated: BTreeSet<String>,
}

impl ExcerptClaim {
    /// Claim with a single source excerpt
    pub fn new(reference: impl Into<String>, language: &str, excerpt: impl Into<String>) -> Self {
        Self {
            id: None,
            reference: reference.into(),
            excerpts: BTreeMap::from([(language_key(language), excerpt.into())]),
            monologue: false,
            generated: BTreeSet::new(),
        }
    }

    /// Set the identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark the excerpt as monologue content
    pub fn with_monologue(mut self, monologue: bool) -> Self {
        self.monologue = monologue;
        self
    }

    /// Excerpt for a language, in any ISO code format; blank counts as absent
    pub fn excerpt(&self, language: &str) -> Option<&str> {
        self.excerpts
            .get(language)
            .or_else(|| {
                self.excerpts
                    .iter()
                    .find(|(code, _)| language_codes_match(code, language))
                    .map(|(_, text)| text)
            })
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Label for log lines: the id when present, else the reference
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.reference)
    }

    /// Record an excerpt unless one already exists; returns whether it was set
    fn fill(&mut self, language: &str, text: &str) -> bool {
        if self.excerpt(language).is_some() {
            return false;
        }
        self.excerpts.insert(language_key(language), text.to_string());
        true
    }
}

fn language_key(language: &str) -> String {
    canonical_code(language).unwrap_or_else(|_| language.trim().to_lowercase())
}

/// On-disk claims format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimsFile {
    #[serde(default)]
    pub claims: Vec<ExcerptClaim>,
}

impl ClaimsFile {
    /// Parse a claims file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read claims file: {:?}", path))?;
        let file: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse claims file: {:?}", path))?;
        debug!("Loaded {} claims from {:?}", file.claims.len(), path);
        Ok(file)
    }

    /// Write as pretty-printed JSON, replacing the file in one step
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize claims")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write claims file: {:?}", tmp))?;
        fs::rename(&tmp, path).with_context(|| format!("Failed to replace claims file: {:?}", path))?;
        info!("Wrote {} claims to {:?}", self.claims.len(), path);
        Ok(())
    }
}

/// Store aligned target excerpts into claims that lack one.
///
/// `results` pairs with `claims` by position (a batch may stop early, so it
/// can be shorter). Existing excerpts are never overwritten. Returns the
/// number of claims filled.
pub fn apply_alignments(claims: &mut [ExcerptClaim], results: &[AlignmentResult], target_language: &str) -> usize {
    let mut filled = 0;
    for (claim, result) in claims.iter_mut().zip(results) {
        let Some(text) = result.text.as_deref() else {
            continue;
        };
        if claim.fill(target_language, text) {
            debug!("{}: filled {} excerpt via {}", claim.label(), target_language, result.strategy);
            filled += 1;
        }
    }
    info!("Filled {} '{}' excerpts from alignment", filled, target_language);
    filled
}

/// Store machine-generated excerpts, keyed by claim position, and mark them
/// as generated. Existing excerpts are never overwritten.
pub fn apply_generated(claims: &mut [ExcerptClaim], generated: &BTreeMap<usize, String>, target_language: &str) -> usize {
    let mut filled = 0;
    for (index, text) in generated {
        let Some(claim) = claims.get_mut(*index) else {
            warn!("Generated excerpt for unknown claim #{}", index);
            continue;
        };
        if claim.fill(target_language, text) {
            claim.generated.insert(language_key(target_language));
            filled += 1;
        }
    }
    filled
}

/// Rewrite references of misattributed claims to the unit the excerpt was
/// found in. Returns the number of claims corrected.
pub fn apply_corrections(claims: &mut [ExcerptClaim], results: &[ValidationResult]) -> usize {
    let mut corrected = 0;
    for (claim, result) in claims.iter_mut().zip(results) {
        if result.status != ValidationStatus::WrongReference {
            continue;
        }
        if let Some(suggested) = &result.suggested_reference {
            info!("{}: reference {} -> {}", claim.label(), claim.reference, suggested);
            claim.reference = suggested.to_string();
            corrected += 1;
        }
    }
    corrected
}
