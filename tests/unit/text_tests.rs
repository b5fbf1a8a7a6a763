/*!
 * Tests for text normalization and sentence segmentation
 */

use excerpt_align::text::{LanguageProfile, normalize, segment};

use crate::common;

/// Test that normalizing twice changes nothing
#[test]
fn test_normalize_appliedTwice_shouldBeIdempotent() {
    let registry = common::registry();
    let inputs = [
        (common::LOVE_EN, "en"),
        (common::LOVE_FR, "fr"),
        (common::HARVEST_EN, "en"),
        ("Ra: I am Ra. \u{201C}Love\u{201D}1 is   unity 2. Questioner: Thank you.", "en"),
        ("", "en"),
    ];

    for (raw, lang) in inputs {
        let profile = registry.get(lang).unwrap();
        let once = normalize(raw, profile);
        assert_eq!(normalize(&once, profile), once, "input: {raw:?}");
    }
}

/// Test the full set of normalizations on one text
#[test]
fn test_normalize_withLabelsQuotesAndFootnotes_shouldCanonicalize() {
    let registry = common::registry();
    let profile = registry.get("en").unwrap();

    let normalized = normalize(
        "Questioner: Is it \u{2018}so\u{2019}? Ra: I am Ra. It is so1. The  law is one 2.",
        profile,
    );

    assert!(!normalized.contains("Questioner:"));
    assert!(!normalized.contains("Ra:"));
    assert!(normalized.contains("'so'"));
    assert!(normalized.contains("It is so."));
    assert!(normalized.contains("The law is one."));
}

/// Test that normalizing never panics on odd input
#[test]
fn test_normalize_unrecognizedInput_shouldReturnItself() {
    let profile = LanguageProfile::new("ja").unwrap();
    assert_eq!(normalize("愛は一つです。", &profile), "愛は一つです。");
    assert_eq!(normalize("   ", &profile), "");
}

/// Test that the filtered sequence is numbered from zero without gaps
#[test]
fn test_segment_afterFiltering_shouldIndexContiguously() {
    let registry = common::registry();
    let profile = registry.get("en").unwrap();

    let sentences = segment(&normalize(common::LOVE_EN, profile), profile);
    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();

    assert_eq!(texts, vec!["What is love?", "Love is unity.", "It is the Creator."]);
    for (position, sentence) in sentences.iter().enumerate() {
        assert_eq!(sentence.index, position);
    }
}

/// Test that glued sentences are split and results are stable
#[test]
fn test_segment_gluedSentences_shouldSplitDeterministically() {
    let profile = LanguageProfile::new("en").unwrap();
    let text = "The harvest is near.The density of love follows.";

    let first = segment(text, &profile);
    let second = segment(text, &profile);

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].text, "The density of love follows.");
}
