/*!
 * Cross-lingual excerpt alignment.
 *
 * Given a source-language excerpt and the full source and target texts of
 * the same unit, find the excerpt's counterpart span in the target text
 * using structure alone (sentence order, punctuation, relative position).
 *
 * # Architecture
 *
 * - `proportional`: sentence-index mapping (high confidence)
 * - `char_offset`: character-offset mapping (medium confidence)
 * - `lead_span`: opening-monologue fallback (low confidence)
 * - `orchestrator`: runs the enabled strategies in priority order
 * - `confidence`: strategy to confidence grade
 * - `models`: result types
 */

pub mod char_offset;
pub mod confidence;
pub mod lead_span;
pub mod models;
pub mod orchestrator;
pub mod proportional;

// Re-export main types
pub use models::{AlignmentResult, Confidence, Strategy};
pub use orchestrator::{Aligner, AlignmentConfig, AlignmentInput};
