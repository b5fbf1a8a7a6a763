/*!
 * Verification reports.
 *
 * One flat record per claim plus per-status counts. Records serialize as
 * `{"reference", "status", "suggestedReference"?}`, the shape downstream
 * tooling reads.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ValidationResult, ValidationStatus};
use crate::alignment::Confidence;
use crate::alignment::confidence::classify_validation;

/// One claim's verification outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Claim identifier, when the claim had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reference as written in the claim
    pub reference: String,
    /// Outcome
    pub status: ValidationStatus,
    /// Unit the excerpt was found in instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_reference: Option<String>,
    /// Supporting sentence from the corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    /// Grade implied by the outcome; findings are not graded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl ReportRecord {
    /// Build a record from a claim reference and its result
    pub fn new(id: Option<String>, reference: impl Into<String>, result: &ValidationResult) -> Self {
        Self {
            id,
            reference: reference.into(),
            status: result.status,
            suggested_reference: result.suggested_reference.as_ref().map(ToString::to_string),
            evidence: result.evidence_snippet.clone(),
            confidence: classify_validation(result.status),
        }
    }
}

/// Counts per status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub counts: BTreeMap<ValidationStatus, usize>,
}

impl ReportSummary {
    /// Number of records with the given status
    pub fn count(&self, status: ValidationStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Whether every record is valid
    pub fn all_valid(&self) -> bool {
        self.count(ValidationStatus::Valid) == self.total
    }
}

/// Full report for a verification run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Language the claims were verified in
    pub language: String,
    pub records: Vec<ReportRecord>,
    pub summary: ReportSummary,
    /// Set when the run stopped before every claim was verified
    #[serde(default)]
    pub aborted: bool,
}

impl VerificationReport {
    /// Build a report, tallying statuses
    pub fn new(language: impl Into<String>, records: Vec<ReportRecord>, aborted: bool) -> Self {
        let mut summary = ReportSummary {
            total: records.len(),
            counts: BTreeMap::new(),
        };
        for record in &records {
            *summary.counts.entry(record.status).or_insert(0) += 1;
        }
        Self {
            language: language.into(),
            records,
            summary,
            aborted,
        }
    }

    /// `(cited, suggested)` pairs for every wrong reference
    pub fn corrections(&self) -> Vec<(&str, &str)> {
        self.records
            .iter()
            .filter_map(|r| Some((r.reference.as_str(), r.suggested_reference.as_deref()?)))
            .collect()
    }

    /// Human readable one-line summary
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = ValidationStatus::ALL
            .iter()
            .filter(|status| self.summary.count(**status) > 0)
            .map(|status| format!("{} {}", self.summary.count(*status), status))
            .collect();

        if parts.is_empty() {
            format!("0 claims verified ({})", self.language)
        } else {
            format!(
                "{} claims verified ({}): {}",
                self.summary.total,
                self.language,
                parts.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::UnitKey;

    fn report() -> VerificationReport {
        let records = vec![
            ReportRecord::new(Some("q1".into()), "1.1", &ValidationResult::valid(1.0, None)),
            ReportRecord::new(
                None,
                "1.2",
                &ValidationResult::wrong_reference(UnitKey::new(2, 3), 0.1, None),
            ),
            ReportRecord::new(None, "x", &ValidationResult::status_only(ValidationStatus::InvalidReference)),
        ];
        VerificationReport::new("en", records, false)
    }

    #[test]
    fn test_new_shouldCountStatuses() {
        let report = report();
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.count(ValidationStatus::Valid), 1);
        assert_eq!(report.summary.count(ValidationStatus::QuoteNotFound), 0);
        assert!(!report.summary.all_valid());
    }

    #[test]
    fn test_record_shouldSerializeFlatCamelCase() {
        let report = report();
        let json = serde_json::to_value(&report.records[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "reference": "1.2",
                "status": "WrongReference",
                "suggestedReference": "2.3"
            })
        );
        let valid = serde_json::to_value(&report.records[0]).unwrap();
        assert!(valid.get("suggestedReference").is_none());
    }

    #[test]
    fn test_corrections_shouldOnlyListWrongReferences() {
        assert_eq!(report().corrections(), vec![("1.2", "2.3")]);
    }

    #[test]
    fn test_summaryLine_shouldListNonZeroStatuses() {
        assert_eq!(
            report().summary_line(),
            "3 claims verified (en): 1 valid, 1 wrong reference, 1 invalid reference"
        );
    }
}
