/*!
 * Confidence grading.
 *
 * Confidence follows from which strategy succeeded: sentence-index mapping
 * is the most faithful, character offsets tolerate segmentation drift at
 * the cost of boundary precision, and the lead span is a bounded guess.
 * Verification outcomes are findings; only `Valid` carries a grade.
 */

use super::models::{Confidence, Strategy};
use crate::validation::ValidationStatus;

/// Confidence for a span produced by `strategy`
pub fn classify(strategy: Strategy) -> Option<Confidence> {
    match strategy {
        Strategy::Proportional => Some(Confidence::High),
        Strategy::CharOffset => Some(Confidence::Medium),
        Strategy::LeadSpan => Some(Confidence::Low),
        Strategy::None => None,
    }
}

/// Confidence implied by a verification outcome
pub fn classify_validation(status: ValidationStatus) -> Option<Confidence> {
    match status {
        ValidationStatus::Valid => Some(Confidence::High),
        _ => None,
    }
}
