/*!
 * Integration tests for the JSON corpus to SQLite store workflow
 */

use anyhow::Result;
use std::sync::Arc;

use excerpt_align::claims::ExcerptClaim;
use excerpt_align::corpus::{CorpusFile, UnitKey, UnitStore, load_corpus};
use excerpt_align::database::SqliteStore;
use excerpt_align::engine::Engine;
use excerpt_align::validation::ValidationStatus;

use crate::common;

/// Test that a corpus directory loads every file below it
#[test]
fn test_loadCorpus_directory_shouldMergeFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("sessions");
    std::fs::create_dir_all(&nested)?;
    common::create_sample_corpus(temp_dir.path())?;
    common::create_test_file(
        &nested,
        "late.json",
        r#"{"units": [{"sequence": 4, "subsequence": 1, "texts": {"fr": "La troisième densité est celle du choix."}}]}"#,
    )?;
    common::create_test_file(temp_dir.path(), "notes.txt", "not a corpus")?;

    let store = load_corpus(temp_dir.path())?;

    assert_eq!(store.len(), 3);
    assert_eq!(
        store.unit_text(&UnitKey::new(4, 1), "fr")?.as_deref(),
        Some("La troisième densité est celle du choix.")
    );
    assert!(store.unit_text(&UnitKey::new(4, 1), "en")?.is_some());
    Ok(())
}

/// Test importing a JSON corpus into SQLite and reading it back
#[test]
fn test_import_jsonCorpusIntoSqlite_shouldServeSameTexts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let corpus_path = common::create_sample_corpus(temp_dir.path())?;
    let memory = load_corpus(&corpus_path)?;

    let store = SqliteStore::open(temp_dir.path().join("corpus.db"))?;
    let stats = store.import_units(&memory.units())?;
    assert_eq!(stats.inserted, 5);
    assert_eq!(stats.updated, 0);

    for key in memory.unit_keys("en")? {
        assert_eq!(store.unit_text(&key, "en")?, memory.unit_text(&key, "en")?);
    }
    assert_eq!(store.unit_keys("fr")?, vec![UnitKey::new(1, 1), UnitKey::new(2, 3)]);
    assert_eq!(store.unit_text(&UnitKey::new(4, 1), "fr")?, None);
    Ok(())
}

/// Test that re-importing unchanged texts writes nothing
#[test]
fn test_import_twice_shouldSkipUnchangedTexts() -> Result<()> {
    let store = SqliteStore::new_in_memory()?;
    let units = common::sample_units();

    store.import_units(&units)?;
    let first = store.get_record(&UnitKey::new(1, 1), "en")?.expect("stored record");

    let stats = store.import_units(&units)?;
    assert_eq!(stats.written(), 0);
    assert_eq!(stats.unchanged, 5);

    let second = store.get_record(&UnitKey::new(1, 1), "eng")?.expect("stored record");
    assert_eq!(first.updated_at, second.updated_at);
    assert_eq!(first.text_hash, SqliteStore::hash_text(common::LOVE_EN));
    Ok(())
}

/// Test that language variants arriving later update the store
#[test]
fn test_import_lateTranslation_shouldBecomeVisibleToEngine() -> Result<()> {
    let store = Arc::new(SqliteStore::new_in_memory()?);
    store.import_units(&common::sample_units())?;
    let engine = Engine::with_defaults(Arc::clone(&store), "Ra")?;

    let mut claim = ExcerptClaim::new("4.1", "en", "The third density is the density of choice.");
    claim
        .excerpts
        .insert("fr".to_string(), "La troisième densité est la densité du choix.".to_string());
    assert_eq!(engine.verify_one(&claim, "fr")?.status, ValidationStatus::MissingTranslation);

    let mut late = common::sample_units().remove(2);
    late.texts.insert(
        "fr".to_string(),
        "Questionneur: Qu'est-ce que la troisième densité? Je suis Ra. La troisième densité est la densité du choix. La polarité est choisie ici.".to_string(),
    );
    let stats = store.import_units(&[late])?;
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.unchanged, 1);

    engine.invalidate();
    assert_eq!(engine.verify_one(&claim, "fr")?.status, ValidationStatus::Valid);
    Ok(())
}

/// Test that a sequence of zero is rejected without a partial import
#[test]
fn test_import_invalidUnit_shouldRollBack() -> Result<()> {
    let store = SqliteStore::new_in_memory()?;
    let mut units = common::sample_units();
    units[2].sequence = 0;

    assert!(store.import_units(&units).is_err());
    assert!(store.unit_keys("en")?.is_empty());
    Ok(())
}

/// Test that an exported database loads back as the same corpus
#[test]
fn test_export_thenLoadCorpus_shouldServeSameTexts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = SqliteStore::new_in_memory()?;
    store.import_units(&common::sample_units())?;

    let path = temp_dir.path().join("exported.json");
    CorpusFile {
        units: store.export_units()?,
    }
    .write(&path)?;

    let reloaded = load_corpus(&path)?;
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.unit_keys("fr")?, store.unit_keys("fr")?);
    assert_eq!(
        reloaded.unit_text(&UnitKey::new(2, 3), "en")?,
        store.unit_text(&UnitKey::new(2, 3), "en")?
    );
    Ok(())
}
