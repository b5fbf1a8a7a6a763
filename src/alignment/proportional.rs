/*!
 * Proportional sentence-index mapping.
 *
 * Finds where the excerpt starts in the source sentence sequence, checks
 * that the following excerpt sentences line up with the following source
 * sentences, then carries the relative position and length over to the
 * target sequence. Works when the two editions keep roughly the same
 * sentence structure; every span starts and ends on a sentence boundary.
 */

use log::debug;

use super::orchestrator::AlignmentConfig;
use crate::text::normalizer::comparison_form;
use crate::text::segmenter::{Sentence, join_sentences};

/// Map the excerpt onto the target sequence, or `None` when the excerpt
/// cannot be located in the source sequence with enough continuity.
pub fn align_by_sentence_index(
    excerpt: &[Sentence],
    source: &[Sentence],
    target: &[Sentence],
    config: &AlignmentConfig,
) -> Option<String> {
    if excerpt.is_empty() || source.is_empty() || target.is_empty() {
        return None;
    }

    let excerpt_keys: Vec<String> = excerpt.iter().map(|s| comparison_form(&s.text)).collect();
    let source_keys: Vec<String> = source.iter().map(|s| comparison_form(&s.text)).collect();

    let source_start = find_source_start(&excerpt_keys, &source_keys, config)?;
    let (target_start, target_end) = map_span(source_start, excerpt.len(), source.len(), target.len());

    debug!(
        "Sentence mapping: source {}/{} -> target [{}, {}) of {}",
        source_start,
        source.len(),
        target_start,
        target_end,
        target.len()
    );

    Some(join_sentences(&target[target_start..target_end]))
}

/// First source index where the excerpt opener matches and enough of the
/// excerpt's sentences verify in sequence
fn find_source_start(excerpt: &[String], source: &[String], config: &AlignmentConfig) -> Option<usize> {
    let opener = excerpt.first()?;

    for (index, candidate) in source.iter().enumerate() {
        if !sentences_match(opener, candidate, config) {
            continue;
        }

        let verified = verified_run(excerpt, &source[index..], config);
        let ratio = verified as f64 / excerpt.len() as f64;
        if ratio >= config.continuity_ratio {
            return Some(index);
        }
        debug!(
            "Rejected source start {}: {} of {} excerpt sentences verified",
            index,
            verified,
            excerpt.len()
        );
    }

    None
}

/// Number of leading excerpt sentences matching the source run, in a row
fn verified_run(excerpt: &[String], source_run: &[String], config: &AlignmentConfig) -> usize {
    excerpt
        .iter()
        .zip(source_run)
        .take_while(|(e, s)| sentences_match(e, s, config))
        .count()
}

/// Prefix containment in either direction, or an exact leading prefix
fn sentences_match(excerpt: &str, source: &str, config: &AlignmentConfig) -> bool {
    if excerpt.is_empty() || source.is_empty() {
        return false;
    }

    source.contains(char_prefix(excerpt, config.opener_chars))
        || excerpt.contains(char_prefix(source, config.opener_chars))
        || char_prefix(excerpt, config.prefix_match_chars) == char_prefix(source, config.prefix_match_chars)
}

/// Target sentence range `[start, end)` for a source span
fn map_span(source_start: usize, excerpt_count: usize, source_count: usize, target_count: usize) -> (usize, usize) {
    let scale = target_count as f64 / source_count as f64;

    let start = ((source_start as f64) * scale).round() as usize;
    let start = start.min(target_count - 1);

    let length = if excerpt_count >= source_count {
        // The excerpt is the whole unit; take the whole target
        target_count
    } else {
        ((excerpt_count as f64) * scale)
            .round()
            .max(1.0)
            .min((excerpt_count + 1) as f64) as usize
    };

    (start, (start + length).min(target_count))
}

/// Longest prefix of at most `n` characters
fn char_prefix(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Sentence {
                index,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_alignBySentenceIndex_singleSentence_shouldMapProportionally() {
        let source = sentences(&["What is love?", "Love is unity.", "It is the Creator."]);
        let target = sentences(&["Qu'est-ce que l'amour?", "L'amour est l'unité.", "C'est le Créateur."]);
        let excerpt = sentences(&["Love is unity."]);

        let result = align_by_sentence_index(&excerpt, &source, &target, &AlignmentConfig::default());
        assert_eq!(result.as_deref(), Some("L'amour est l'unité."));
    }

    #[test]
    fn test_alignBySentenceIndex_excerptNotInSource_shouldReturnNone() {
        let source = sentences(&["What is love?", "Love is unity."]);
        let target = sentences(&["Qu'est-ce que l'amour?", "L'amour est l'unité."]);
        let excerpt = sentences(&["Something else entirely."]);

        assert!(align_by_sentence_index(&excerpt, &source, &target, &AlignmentConfig::default()).is_none());
    }

    #[test]
    fn test_alignBySentenceIndex_brokenContinuity_shouldReturnNone() {
        let source = sentences(&[
            "The first sentence of the unit.",
            "The second sentence of the unit.",
            "The third sentence of the unit.",
        ]);
        let target = sentences(&["Un.", "Deux.", "Trois."]);
        let excerpt = sentences(&[
            "The first sentence of the unit.",
            "A sentence that does not exist.",
            "Another invented one here.",
        ]);

        assert!(align_by_sentence_index(&excerpt, &source, &target, &AlignmentConfig::default()).is_none());
    }

    #[test]
    fn test_alignBySentenceIndex_wholeUnit_shouldReturnWholeTarget() {
        let source = sentences(&["Sentence number one.", "Sentence number two."]);
        let target = sentences(&["Phrase un.", "Phrase deux.", "Phrase trois.", "Phrase quatre."]);

        let result = align_by_sentence_index(&source, &source, &target, &AlignmentConfig::default());
        assert_eq!(
            result.as_deref(),
            Some("Phrase un. Phrase deux. Phrase trois. Phrase quatre.")
        );
    }

    #[test]
    fn test_mapSpan_shouldCapLengthAndClampStart() {
        // 1 of 2 source sentences onto 10 target sentences: capped at 2
        assert_eq!(map_span(0, 1, 2, 10), (0, 2));
        // Start past the end is clamped onto the last target sentence
        assert_eq!(map_span(4, 1, 5, 4), (3, 4));
        // Fewer target sentences never yield an empty span
        assert_eq!(map_span(1, 1, 10, 2), (0, 1));
    }

    #[test]
    fn test_sentencesMatch_shouldAcceptPrefixContainmentEitherWay() {
        let config = AlignmentConfig::default();
        assert!(sentences_match("love is unity", "love is unity and more", &config));
        assert!(sentences_match("love is unity and more", "love is unity", &config));
        assert!(!sentences_match("love is unity", "", &config));
        assert!(!sentences_match("love is unity", "light is love", &config));
    }

    #[test]
    fn test_charPrefix_shouldRespectCharBoundaries() {
        assert_eq!(char_prefix("unité", 4), "unit");
        assert_eq!(char_prefix("été", 2), "ét");
        assert_eq!(char_prefix("ab", 10), "ab");
    }
}
