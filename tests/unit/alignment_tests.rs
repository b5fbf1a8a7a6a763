/*!
 * Tests for the alignment strategies and their orchestration
 */

use excerpt_align::alignment::{Aligner, AlignmentConfig, AlignmentInput, Confidence, Strategy};
use excerpt_align::text::{LanguageRegistry, normalize, segment};

use crate::common;

fn input<'a>(
    registry: &'a LanguageRegistry,
    excerpt: &'a str,
    source_full: &'a str,
    target_full: &'a str,
) -> AlignmentInput<'a> {
    AlignmentInput {
        excerpt,
        source_full,
        target_full,
        source_profile: registry.get("en").unwrap(),
        target_profile: registry.get("fr").unwrap(),
        monologue: false,
    }
}

/// Test that a single answer sentence maps onto its French counterpart
#[test]
fn test_align_singleAnswerSentence_shouldMapProportionally() {
    let registry = common::registry();
    let result = Aligner::default().align(&input(&registry, "Love is unity.", common::LOVE_EN, common::LOVE_FR));

    assert_eq!(result.text.as_deref(), Some("L'amour est l'unité."));
    assert_eq!(result.strategy, Strategy::Proportional);
    assert_eq!(result.confidence, Some(Confidence::High));
}

/// Test that an excerpt spanning the whole unit yields the whole target
#[test]
fn test_align_excerptSpanningWholeUnit_shouldReturnWholeTarget() {
    let registry = common::registry();
    let source = "The harvest is near. Love is unity and all is one. The end comes soon.";
    let target = "La moisson est proche. L'amour est l'unité et tout est un. La fin vient bientôt.";

    let result = Aligner::default().align(&input(&registry, source, source, target));

    assert_eq!(result.text.as_deref(), Some(target));
    assert_eq!(result.strategy, Strategy::Proportional);
}

/// Test that the same input always gives the same result
#[test]
fn test_align_repeatedCalls_shouldBeIdentical() {
    let registry = common::registry();
    let aligner = Aligner::default();
    let input = input(
        &registry,
        "The harvest is the culmination of a cycle of experience.",
        common::HARVEST_EN,
        common::HARVEST_FR,
    );

    let first = aligner.align(&input);
    for _ in 0..10 {
        assert_eq!(aligner.align(&input), first);
    }
}

/// Test that sentence-mapped spans start and end on sentence boundaries
#[test]
fn test_align_proportionalSpan_shouldBeWholeTargetSentences() {
    let registry = common::registry();
    let fr = registry.get("fr").unwrap();
    let target_sentences: Vec<String> = segment(&normalize(common::HARVEST_FR, fr), fr)
        .into_iter()
        .map(|s| s.text)
        .collect();

    let result = Aligner::default().align(&input(
        &registry,
        "Each entity is measured by its light.",
        common::HARVEST_EN,
        common::HARVEST_FR,
    ));

    let text = result.text.expect("aligned span");
    assert_eq!(result.strategy, Strategy::Proportional);
    assert!(target_sentences.iter().any(|s| text.starts_with(s.as_str())));
    assert!(target_sentences.iter().any(|s| text.ends_with(s.as_str())));
}

/// Test that the offset strategy never cuts a word in half
#[test]
fn test_align_charOffsetSpan_shouldNotStartOrEndMidWord() {
    let registry = common::registry();
    let target = "La moisson est proche. L'amour est l'unité et tout est un. La fin vient.";
    let config = AlignmentConfig::default().with_strategies(&[Strategy::CharOffset]);

    let result = Aligner::new(config).align(&input(
        &registry,
        "Love is unity and all is one.",
        "The harvest is near. Love is unity and all is one. The end comes.",
        target,
    ));

    let text = result.text.expect("aligned span");
    assert_eq!(result.confidence, Some(Confidence::Medium));
    let start = target.find(text.as_str()).expect("span is a slice of the target");
    let end = start + text.len();
    assert!(start == 0 || target[..start].ends_with(' '));
    assert!(end == target.len() || target[end..].starts_with(' '));
    assert!(text.ends_with('.'));
}

/// Test that the lead span only runs for monologue claims
#[test]
fn test_align_leadSpan_shouldRequireMonologue() {
    let registry = common::registry();
    let mut input = input(
        &registry,
        "An invented opening sentence. And a second invented one.",
        "The real opening of the talk. The real continuation here.",
        "La vraie ouverture du discours. La vraie suite ici. Une autre phrase.",
    );

    let aligner = Aligner::default();
    assert_eq!(aligner.align(&input).strategy, Strategy::None);

    input.monologue = true;
    let result = aligner.align(&input);
    assert_eq!(result.strategy, Strategy::LeadSpan);
    assert_eq!(result.confidence, Some(Confidence::Low));
    assert_eq!(
        result.text.as_deref(),
        Some("La vraie ouverture du discours. La vraie suite ici.")
    );
}

/// Test that an unlocatable excerpt yields an absent result
#[test]
fn test_align_unrelatedExcerpt_shouldBeAbsent() {
    let registry = common::registry();
    let result = Aligner::default().align(&input(
        &registry,
        "Completely unrelated words about gardening tools.",
        common::LOVE_EN,
        common::LOVE_FR,
    ));

    assert!(!result.is_found());
    assert_eq!(result.strategy, Strategy::None);
    assert_eq!(result.confidence, None);
}
