/*!
 * Tests for corpus verification of excerpt claims
 */

use excerpt_align::claims::ExcerptClaim;
use excerpt_align::corpus::{MemoryStore, UnitKey};
use excerpt_align::engine::Engine;
use excerpt_align::validation::{LexicalSignature, ValidationStatus, VerificationConfig};

use crate::common;

fn engine() -> Engine<MemoryStore> {
    Engine::with_defaults(common::sample_store(), "Ra").unwrap()
}

/// Test that an excerpt found in its cited unit is valid with evidence
#[test]
fn test_verifyOne_correctCitation_shouldBeValid() {
    let claim = ExcerptClaim::new("1.1", "en", "Love is unity.");
    let result = engine().verify_one(&claim, "en").unwrap();

    assert_eq!(result.status, ValidationStatus::Valid);
    assert_eq!(result.coverage, 1.0);
    assert_eq!(result.evidence_snippet.as_deref(), Some("Love is unity."));
    assert_eq!(result.suggested_reference, None);
}

/// Test that a fabricated excerpt is not found anywhere
#[test]
fn test_verifyOne_fabricatedExcerpt_shouldBeQuoteNotFound() {
    let claim = ExcerptClaim::new("2.3", "en", "Bananas orchestrate interplanetary parliaments nightly.");
    let result = engine().verify_one(&claim, "en").unwrap();

    assert_eq!(result.status, ValidationStatus::QuoteNotFound);
    assert_eq!(result.suggested_reference, None);
    assert_eq!(result.coverage, 0.0);
}

/// Test that a real excerpt cited under the wrong unit points to the right one
#[test]
fn test_verifyOne_misattributedExcerpt_shouldSuggestRealUnit() {
    let claim = ExcerptClaim::new("1.1", "en", "The harvest is the culmination of a cycle of experience.");
    let result = engine().verify_one(&claim, "en").unwrap();

    assert_eq!(result.status, ValidationStatus::WrongReference);
    assert_eq!(result.suggested_reference, Some(UnitKey::new(2, 3)));
    assert_eq!(
        result.evidence_snippet.as_deref(),
        Some("The harvest is the culmination of a cycle of experience.")
    );
}

/// Test that a claim without a French excerpt is a missing translation
#[test]
fn test_verifyOne_claimWithoutTargetExcerpt_shouldBeMissingTranslation() {
    let claim = ExcerptClaim::new("4.1", "en", "The third density is the density of choice.");
    let result = engine().verify_one(&claim, "fr").unwrap();

    assert_eq!(result.status, ValidationStatus::MissingTranslation);
    assert_ne!(result.status, ValidationStatus::QuoteNotFound);
}

/// Test that a unit present in English but absent in French is a missing translation
#[test]
fn test_verifyOne_unitWithoutTargetText_shouldBeMissingTranslation() {
    let mut claim = ExcerptClaim::new("4.1", "en", "The third density is the density of choice.");
    claim
        .excerpts
        .insert("fr".to_string(), "La troisième densité est celle du choix.".to_string());
    let result = engine().verify_one(&claim, "fr").unwrap();

    assert_eq!(result.status, ValidationStatus::MissingTranslation);
    assert_eq!(result.suggested_reference, None);
}

/// Test that a well-formed key with no text in any language is reported
#[test]
fn test_verifyOne_unknownUnit_shouldBeSessionNotFound() {
    let engine = engine();

    let absent = ExcerptClaim::new("9.9", "en", "Love is unity.");
    assert_eq!(engine.verify_one(&absent, "en").unwrap().status, ValidationStatus::SessionNotFound);

    let mut absent_french = ExcerptClaim::new("9.9", "en", "Love is unity.");
    absent_french
        .excerpts
        .insert("fr".to_string(), "L'amour est l'unité.".to_string());
    assert_eq!(engine.verify_one(&absent_french, "fr").unwrap().status, ValidationStatus::SessionNotFound);
}

/// Test that malformed references are reported, not raised
#[test]
fn test_verifyOne_malformedReference_shouldBeInvalidReference() {
    let engine = engine();
    for reference in ["42", "", "1.x", "collection with space:1.1", "0.1"] {
        let claim = ExcerptClaim::new(reference, "en", "Love is unity.");
        assert_eq!(
            engine.verify_one(&claim, "en").unwrap().status,
            ValidationStatus::InvalidReference,
            "reference {reference:?}"
        );
    }
}

/// Test that coverage stays within [0, 1] for every outcome
#[test]
fn test_verifyOne_anyClaim_shouldKeepCoverageInUnitInterval() {
    let engine = engine();
    for claim in common::sample_claims() {
        let result = engine.verify_one(&claim, "en").unwrap();
        assert!((0.0..=1.0).contains(&result.coverage), "claim {:?}", claim.id);
    }
}

/// Test that an excerpt copied verbatim from the text scores full coverage
#[test]
fn test_coverage_verbatimSubstring_shouldBeOne() {
    let config = VerificationConfig::default();
    let folded = "the third density is the density of choice. polarity is chosen here.";

    let long = LexicalSignature::new("The third density is the density of choice.", &config);
    assert_eq!(long.coverage(folded), 1.0);

    let short = LexicalSignature::new("It is so", &config);
    assert!(short.tokens().is_empty());
    assert_eq!(short.coverage("yes, it is so."), 1.0);
    assert_eq!(short.coverage("it is not"), 0.0);
}

/// Test that verification is repeatable
#[test]
fn test_verifyOne_repeatedCalls_shouldBeIdentical() {
    let engine = engine();
    for claim in common::sample_claims() {
        let first = engine.verify_one(&claim, "en").unwrap();
        assert_eq!(engine.verify_one(&claim, "en").unwrap(), first);
    }
}
