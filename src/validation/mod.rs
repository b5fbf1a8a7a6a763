/*!
 * Verification of quoted excerpts against the corpus.
 *
 * Checks that a claimed excerpt actually appears in the unit it cites and,
 * when it does not, looks for the unit it really comes from.
 *
 * # Architecture
 *
 * - `signature`: lexical signature and coverage scoring
 * - `verifier`: per-claim verification over a `CorpusIndex`
 * - `report`: flat records for downstream reporting
 */

pub mod report;
pub mod signature;
pub mod verifier;

use serde::{Deserialize, Serialize};

use crate::corpus::UnitKey;

// Re-export main types
pub use report::{ReportRecord, ReportSummary, VerificationReport};
pub use signature::LexicalSignature;
pub use verifier::{CorpusIndex, Verifier};

/// Configuration for corpus verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Coverage at or above which an excerpt counts as present
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f64,

    /// Maximum number of tokens in a lexical signature
    #[serde(default = "default_signature_size")]
    pub signature_size: usize,

    /// Minimum characters for a token to enter the signature
    #[serde(default = "default_min_token_chars")]
    pub min_token_chars: usize,

    /// Maximum characters of an evidence snippet
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

fn default_coverage_threshold() -> f64 {
    0.8
}

fn default_signature_size() -> usize {
    15
}

fn default_min_token_chars() -> usize {
    5
}

fn default_snippet_chars() -> usize {
    160
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: default_coverage_threshold(),
            signature_size: default_signature_size(),
            min_token_chars: default_min_token_chars(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

impl VerificationConfig {
    /// Check thresholds are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.coverage_threshold <= 0.0 || self.coverage_threshold > 1.0 {
            return Err(anyhow::anyhow!(
                "coverage_threshold must be in (0, 1], got {}",
                self.coverage_threshold
            ));
        }
        if self.signature_size == 0 {
            return Err(anyhow::anyhow!("signature_size must be greater than zero"));
        }
        Ok(())
    }
}

/// Outcome of verifying one claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// The excerpt is in the cited unit
    Valid,
    /// The excerpt is in a different unit than the one cited
    WrongReference,
    /// The excerpt is nowhere in the corpus
    QuoteNotFound,
    /// The claim has no excerpt for the language, or the unit exists but
    /// has no text in it
    MissingTranslation,
    /// The reference is not a well-formed unit key
    InvalidReference,
    /// No unit with that key exists in any language
    SessionNotFound,
}

impl ValidationStatus {
    /// All statuses, in report order
    pub const ALL: [ValidationStatus; 6] = [
        Self::Valid,
        Self::WrongReference,
        Self::QuoteNotFound,
        Self::MissingTranslation,
        Self::InvalidReference,
        Self::SessionNotFound,
    ];
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Valid => "valid",
            Self::WrongReference => "wrong reference",
            Self::QuoteNotFound => "quote not found",
            Self::MissingTranslation => "missing translation",
            Self::InvalidReference => "invalid reference",
            Self::SessionNotFound => "session not found",
        };
        write!(f, "{}", name)
    }
}

/// Result of verifying one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Outcome
    pub status: ValidationStatus,
    /// Where the excerpt really is; only set for `WrongReference`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_reference: Option<UnitKey>,
    /// Sentence of the matching unit that contains the excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_snippet: Option<String>,
    /// Coverage of the excerpt's signature in the cited unit, 0.0 to 1.0
    #[serde(default)]
    pub coverage: f64,
}

impl ValidationResult {
    /// A status with no further detail
    pub fn status_only(status: ValidationStatus) -> Self {
        Self {
            status,
            suggested_reference: None,
            evidence_snippet: None,
            coverage: 0.0,
        }
    }

    /// The excerpt was found in the cited unit
    pub fn valid(coverage: f64, evidence_snippet: Option<String>) -> Self {
        Self {
            status: ValidationStatus::Valid,
            suggested_reference: None,
            evidence_snippet,
            coverage,
        }
    }

    /// The excerpt was found under another key
    pub fn wrong_reference(suggested: UnitKey, coverage: f64, evidence_snippet: Option<String>) -> Self {
        Self {
            status: ValidationStatus::WrongReference,
            suggested_reference: Some(suggested),
            evidence_snippet,
            coverage,
        }
    }

    /// The excerpt was not found anywhere
    pub fn quote_not_found(coverage: f64) -> Self {
        Self {
            coverage,
            ..Self::status_only(ValidationStatus::QuoteNotFound)
        }
    }
}
