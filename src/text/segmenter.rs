/*!
 * Sentence segmentation of normalized unit text.
 *
 * Boundaries are one or more of `. ! ?` (plus any closing quotes or
 * brackets) followed by whitespace; the punctuation stays with the sentence
 * it ends. Sentences too short to carry alignable content, and bare
 * greeting remnants, are filtered out and the survivors are re-indexed.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalizer::fold_case;
use super::profile::LanguageProfile;

/// Sentence-ending punctuation glued to the next sentence's capital letter
static RE_GLUED_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?:])(\p{Lu})").expect("valid glued sentence regex"));

/// A sentence boundary: terminal punctuation, closing marks, whitespace
static RE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["')\]]*\s+"#).expect("valid boundary regex"));

/// One retained sentence of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position in the filtered sentence sequence
    pub index: usize,
    /// Trimmed sentence text, terminal punctuation included
    pub text: String,
}

impl Sentence {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split normalized text into its retained sentences.
pub fn segment(normalized: &str, profile: &LanguageProfile) -> Vec<Sentence> {
    let greetings: Vec<String> = profile
        .greetings
        .iter()
        .map(|g| fold_case(g.trim()))
        .collect();

    split_raw(normalized)
        .into_iter()
        .filter(|s| s.chars().count() >= profile.min_sentence_chars)
        .filter(|s| !greetings.contains(&fold_case(s)))
        .enumerate()
        .map(|(index, text)| Sentence { index, text })
        .collect()
}

/// Segment an excerpt.
///
/// An excerpt may be a single short sentence that the length filter would
/// drop; in that case the whole excerpt stands as the only sentence.
pub fn segment_excerpt(normalized: &str, profile: &LanguageProfile) -> Vec<Sentence> {
    let sentences = segment(normalized, profile);
    if sentences.is_empty() && !normalized.trim().is_empty() {
        return vec![Sentence {
            index: 0,
            text: normalized.trim().to_string(),
        }];
    }
    sentences
}

/// Split without filtering, after un-gluing run-together sentences
fn split_raw(text: &str) -> Vec<String> {
    let spaced = RE_GLUED_SENTENCE.replace_all(text, "$1 $2");

    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in RE_BOUNDARY.find_iter(&spaced) {
        let end = boundary.start() + boundary.as_str().trim_end().len();
        push_trimmed(&mut sentences, &spaced[start..end]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &spaced[start..]);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece.to_string());
    }
}

/// Join sentences with single spaces
pub fn join_sentences(sentences: &[Sentence]) -> String {
    sentences
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
