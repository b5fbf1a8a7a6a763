/*!
 * # excerpt-align - Cross-lingual excerpt alignment and validation
 *
 * A Rust library for locating a quoted excerpt's counterpart in an
 * independently produced translation of the same text, and for auditing
 * cited excerpts against the corpus they claim to come from.
 *
 * ## Features
 *
 * - Text normalization and sentence segmentation driven by per-language
 *   profiles (speaker labels, opening greetings)
 * - Three alignment strategies run in priority order:
 *   - Proportional sentence-index mapping
 *   - Character-offset proportional mapping
 *   - Lead-span fallback for opening monologues
 * - Corpus verification with lexical coverage and reference correction
 * - JSON and SQLite document stores
 * - Concurrent batch processing with an optional deadline
 * - Optional generation of missing excerpts through Ollama
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `text`: Language profiles, normalizer and segmenter
 * - `alignment`: Alignment strategies and their orchestration
 * - `validation`: Lexical signatures, the corpus verifier and reports
 * - `corpus`: Unit keys, the `UnitStore` trait and JSON corpora
 * - `database`: SQLite-backed unit store
 * - `claims`: Excerpt claims and their write-back
 * - `engine`: Per-claim `align_one` / `verify_one` entry points
 * - `batch`: Claim-level parallel batch driver
 * - `providers`: Translation generator clients
 * - `language_utils`: ISO language code utilities
 * - `errors`: Error types for hard failures
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod batch;
pub mod claims;
pub mod corpus;
pub mod database;
pub mod engine;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod text;
pub mod validation;

// Re-export main types for easier usage
pub use alignment::{Aligner, AlignmentConfig, AlignmentResult, Confidence, Strategy};
pub use app_config::Config;
pub use batch::{BatchOptions, BatchOutcome};
pub use claims::{ClaimsFile, ExcerptClaim};
pub use corpus::{MemoryStore, Unit, UnitKey, UnitStore};
pub use database::SqliteStore;
pub use engine::Engine;
pub use errors::{AppError, ProviderError, ReferenceError, StoreError};
pub use language_utils::{canonical_code, get_language_name, language_codes_match};
pub use text::{LanguageProfile, LanguageRegistry};
pub use validation::{ValidationResult, ValidationStatus, VerificationConfig, VerificationReport};
