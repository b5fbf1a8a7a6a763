/*!
 * Character-offset proportional mapping.
 *
 * Fallback for excerpts that straddle a segmentation artifact. The
 * excerpt's opening characters are located in the source text and the
 * relative offset and length are carried over to the target text. The
 * window end is pushed out to the next sentence end and the start is
 * snapped to a nearby sentence or word boundary, so the span never begins
 * or ends mid-word.
 */

use log::debug;

use super::orchestrator::AlignmentConfig;
use crate::text::normalizer::fold_case;

/// Map the excerpt onto the normalized target text by character ratio.
///
/// All three texts are expected in normalized form.
pub fn align_by_char_offset(
    excerpt: &str,
    source: &str,
    target: &str,
    config: &AlignmentConfig,
) -> Option<String> {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() || source.is_empty() || target.is_empty() {
        return None;
    }

    let probe: String = fold_case(excerpt).chars().take(config.offset_probe_chars).collect();
    let source_folded = fold_case(source);
    let byte_offset = source_folded.find(probe.as_str())?;
    let offset = source_folded[..byte_offset].chars().count();

    let source_len = source.chars().count() as f64;
    let relative_start = offset as f64 / source_len;
    let relative_length = (excerpt.chars().count() as f64 / source_len).min(1.0);

    let chars: Vec<char> = target.chars().collect();
    let target_len = chars.len();
    let raw_start = ((relative_start * target_len as f64).floor() as usize).min(target_len - 1);
    let raw_end = (raw_start + (relative_length * target_len as f64).round() as usize).min(target_len);

    let start = snap_start(&chars, raw_start, config.boundary_slack_chars);
    let end = extend_end(&chars, raw_end.max(start + 1));

    debug!(
        "Offset mapping: source offset {} -> target window [{}, {}) snapped to [{}, {})",
        offset, raw_start, raw_end, start, end
    );

    if start >= end {
        return None;
    }
    let text: String = chars[start..end].iter().collect();
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']')
}

/// If a sentence ends at `i`, the index just past its punctuation run and
/// closing marks
fn boundary_end(chars: &[char], i: usize) -> Option<usize> {
    if !is_terminal(chars[i]) {
        return None;
    }
    let mut j = i + 1;
    while j < chars.len() && (is_terminal(chars[j]) || is_closer(chars[j])) {
        j += 1;
    }
    if j == chars.len() || chars[j].is_whitespace() {
        Some(j)
    } else {
        None
    }
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Move the window start onto a nearby sentence start, preferring the
/// preceding boundary, else the next one within `slack`, else the start of
/// the current word
fn snap_start(chars: &[char], start: usize, slack: usize) -> usize {
    if start == 0 {
        return 0;
    }

    let lower = start.saturating_sub(slack);
    for i in (lower..start).rev() {
        if let Some(after) = boundary_end(chars, i) {
            if after <= start {
                return skip_whitespace(chars, after);
            }
        }
    }

    let upper = (start + slack).min(chars.len());
    for i in start..upper {
        if let Some(after) = boundary_end(chars, i) {
            let next = skip_whitespace(chars, after);
            if next < chars.len() {
                return next;
            }
        }
    }

    let mut i = start;
    while i > 0 && !chars[i - 1].is_whitespace() {
        i -= 1;
    }
    i
}

/// Push the window end forward to the end of the sentence it falls in
fn extend_end(chars: &[char], end: usize) -> usize {
    let from = end.saturating_sub(1);
    for i in from..chars.len() {
        if let Some(after) = boundary_end(chars, i) {
            return after;
        }
    }
    chars.len()
}
