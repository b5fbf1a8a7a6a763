/*!
 * Text normalization for comparison across language variants.
 *
 * Raw unit text comes with transcript furniture that differs between
 * language editions: speaker labels, the entity's opening greeting, footnote
 * markers and typographic quote marks. `normalize` strips all of that so two
 * editions can be segmented and compared structurally. Case is preserved;
 * `fold_case` and `comparison_form` produce comparison-only variants.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::profile::LanguageProfile;

/// Footnote digits glued to the end of a word: "word1." -> "word."
static RE_GLUED_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})\d{1,2}\b").expect("valid glued footnote regex"));

/// Footnote digits after a space, directly before punctuation: "word 1." -> "word."
static RE_SPACED_FOOTNOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\p{L}) \d{1,2}([.,;:!?)\]"'])(\D|$)"#).expect("valid spaced footnote regex")
});

/// Footnote digits at the very start of the text: "1 Word" -> "Word"
static RE_LEADING_FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\s*(\p{L})").expect("valid leading footnote regex"));

/// Normalize raw unit text for the given language.
///
/// Never fails; text without anything to strip comes back with only its
/// whitespace collapsed. Applying it twice yields the same string.
pub fn normalize(raw: &str, profile: &LanguageProfile) -> String {
    // Every pass either removes text or leaves it unchanged, so this ends
    let mut current = normalize_once(raw, profile);
    loop {
        let next = normalize_once(&current, profile);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(raw: &str, profile: &LanguageProfile) -> String {
    let text = canonicalize_quotes(raw);
    let text = strip_speaker_labels(&text, &profile.speaker_prefixes);
    let text = collapse_whitespace(&text);
    let text = strip_leading_greeting(&text, &profile.greetings);
    let text = strip_footnote_markers(text);
    collapse_whitespace(&text)
}

/// Map curly, angled and low-9 quotes and apostrophes to their straight form
pub fn canonicalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2039}'
            | '\u{203A}' | '\u{00B4}' | '\u{0060}' | '\u{FF07}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
            | '\u{00BB}' | '\u{301D}' | '\u{301E}' | '\u{FF02}' => '"',
            other => other,
        })
        .collect()
}

/// Collapse every whitespace run to a single space and trim both ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Remove speaker labels ("Questioner:") found at segment starts.
///
/// A segment starts at the beginning of the text, after a line break, or
/// after sentence-ending punctuation followed by whitespace.
fn strip_speaker_labels(text: &str, labels: &[String]) -> String {
    if labels.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut at_segment_start = true;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if at_segment_start {
            let lead = rest.len() - rest.trim_start().len();
            result.push_str(&rest[..lead]);
            pos += lead;
            // Stacked labels ("Questioner: Questioner:") all go at once
            while let Some(consumed) = speaker_label_len(&text[pos..], labels) {
                pos += consumed;
            }
            at_segment_start = false;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        result.push(ch);
        pos += ch.len_utf8();
        at_segment_start = ch == '\n'
            || (matches!(ch, '.' | '!' | '?') && text[pos..].starts_with(char::is_whitespace));
    }

    result
}

/// Byte length of a speaker label, its colon and trailing whitespace
fn speaker_label_len(text: &str, labels: &[String]) -> Option<usize> {
    labels
        .iter()
        .filter(|label| !label.is_empty())
        .find_map(|label| {
            let head = text.get(..label.len())?;
            if !head.eq_ignore_ascii_case(label) {
                return None;
            }
            let after = text[label.len()..].trim_start_matches([' ', '\t']);
            let tail = after.strip_prefix(':')?.trim_start();
            Some(text.len() - tail.len())
        })
}

/// Remove one of the entity's opening greetings from the start of the text
fn strip_leading_greeting(text: &str, greetings: &[String]) -> String {
    for greeting in greetings.iter().filter(|g| !g.is_empty()) {
        let Some(head) = text.get(..greeting.len()) else {
            continue;
        };
        if fold_case(head) == fold_case(greeting) {
            return text[greeting.len()..].trim_start().to_string();
        }
    }
    text.to_string()
}

fn strip_footnote_markers(text: String) -> String {
    let text = RE_LEADING_FOOTNOTE.replace(&text, "$1");
    let text = RE_SPACED_FOOTNOTE.replace_all(&text, "$1$2$3");
    RE_GLUED_FOOTNOTE.replace_all(&text, "$1").into_owned()
}

/// Lowercase character by character, preserving the character count so
/// offsets computed on the folded text apply to the original
pub fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// Comparison-only form: folded, punctuation removed, whitespace collapsed
pub fn comparison_form(text: &str) -> String {
    let stripped: String = fold_case(text)
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    collapse_whitespace(&stripped)
}
