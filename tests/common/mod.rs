/*!
 * Common test utilities for the excerpt-align test suite
 */

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use excerpt_align::claims::{ClaimsFile, ExcerptClaim};
use excerpt_align::corpus::{CorpusFile, MemoryStore, Unit};
use excerpt_align::text::LanguageRegistry;

/// English text of session 1.1
pub const LOVE_EN: &str = "Questioner: What is love? Ra: I am Ra. Love is unity. It is the Creator.";

/// French text of session 1.1
pub const LOVE_FR: &str =
    "Questionneur: Qu'est-ce que l'amour? Je suis Ra. L'amour est l'unité. C'est le Créateur.";

/// English text of session 2.3
pub const HARVEST_EN: &str = "Questioner: Tell me of the harvest. Ra: I am Ra. The harvest is the \
     culmination of a cycle of experience. Each entity is measured by its light.";

/// French text of session 2.3
pub const HARVEST_FR: &str = "Questionneur: Parlez-moi de la moisson. Je suis Ra. La moisson est \
     l'aboutissement d'un cycle d'expérience. Chaque entité est mesurée par sa lumière.";

/// English text of session 4.1, which has no French text yet
pub const DENSITY_EN: &str = "Questioner: What is the third density? Ra: I am Ra. The third density \
     is the density of choice. Polarity is chosen here.";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Built-in profiles for Ra
pub fn registry() -> LanguageRegistry {
    LanguageRegistry::builtin("Ra").expect("built-in profiles")
}

fn unit(sequence: u32, subsequence: u32, texts: &[(&str, &str)]) -> Unit {
    Unit {
        collection: String::new(),
        sequence,
        subsequence,
        texts: texts
            .iter()
            .map(|(lang, text)| (lang.to_string(), text.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// The sample corpus: two bilingual sessions and one English-only session
pub fn sample_units() -> Vec<Unit> {
    vec![
        unit(1, 1, &[("en", LOVE_EN), ("fr", LOVE_FR)]),
        unit(2, 3, &[("en", HARVEST_EN), ("fr", HARVEST_FR)]),
        unit(4, 1, &[("en", DENSITY_EN)]),
    ]
}

/// Memory store over the sample corpus
pub fn sample_store() -> MemoryStore {
    MemoryStore::from_units(sample_units())
}

/// Writes the sample corpus as a JSON corpus file
pub fn create_sample_corpus(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("corpus.json");
    CorpusFile { units: sample_units() }.write(&path)?;
    Ok(path)
}

/// Claims covering every verification outcome
pub fn sample_claims() -> Vec<ExcerptClaim> {
    vec![
        ExcerptClaim::new("1.1", "en", "Love is unity.").with_id("love"),
        ExcerptClaim::new("1.1", "en", "The harvest is the culmination of a cycle of experience.")
            .with_id("misattributed"),
        ExcerptClaim::new("2.3", "en", "Bananas orchestrate interplanetary parliaments nightly.")
            .with_id("fabricated"),
        ExcerptClaim::new("42", "en", "Love is unity.").with_id("malformed"),
        ExcerptClaim::new("4.1", "en", "The third density is the density of choice.").with_id("untranslated"),
    ]
}

/// Writes claims as a claims file
pub fn create_claims_file(dir: &Path, claims: Vec<ExcerptClaim>) -> Result<PathBuf> {
    let path = dir.join("claims.json");
    ClaimsFile { claims }.write(&path)?;
    Ok(path)
}
