/*!
 * Lead-span fallback.
 *
 * For excerpts the caller knows come from an opening monologue, the same
 * number of sentences from the start of the target is a bounded guess.
 */

use crate::text::segmenter::{Sentence, join_sentences};

/// First `min(excerpt, target)` target sentences, verbatim
pub fn align_by_lead_span(excerpt: &[Sentence], target: &[Sentence]) -> Option<String> {
    if excerpt.is_empty() || target.is_empty() {
        return None;
    }
    let count = excerpt.len().min(target.len());
    Some(join_sentences(&target[..count]))
}
