/*!
 * Text preparation shared by alignment and verification.
 *
 * - `profile`: per-language conventions and the profile registry
 * - `normalizer`: canonical form of raw unit text
 * - `segmenter`: ordered, filtered sentence sequences
 */

pub mod normalizer;
pub mod profile;
pub mod segmenter;

pub use normalizer::{comparison_form, fold_case, normalize};
pub use profile::{LanguageProfile, LanguageRegistry};
pub use segmenter::{Sentence, segment, segment_excerpt};
