/*!
 * Integration tests for the claims batch workflow
 */

use anyhow::Result;
use std::sync::Arc;

use excerpt_align::alignment::Strategy;
use excerpt_align::batch::{self, BatchOptions};
use excerpt_align::claims::{self, ClaimsFile};
use excerpt_align::corpus::load_corpus;
use excerpt_align::engine::Engine;
use excerpt_align::providers::{MockBehavior, MockGenerator};
use excerpt_align::validation::ValidationStatus;

use crate::common;

/// Test aligning a claims file and writing the results back
#[tokio::test]
async fn test_alignBatch_thenWriteBack_shouldFillOnlyMissingExcerpts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let corpus_path = common::create_sample_corpus(temp_dir.path())?;
    let mut claims = common::sample_claims();
    claims[0].excerpts.insert("fr".to_string(), "Déjà traduit.".to_string());
    let claims_path = common::create_claims_file(temp_dir.path(), claims)?;

    let engine = Arc::new(Engine::with_defaults(load_corpus(&corpus_path)?, "Ra")?);
    let mut file = ClaimsFile::read(&claims_path)?;
    let outcome = batch::align_batch(engine, &file.claims, "en", "fr", &BatchOptions::default(), |_, _| {}).await?;

    assert_eq!(outcome.results.len(), 5);
    assert!(!outcome.aborted);
    assert_eq!(outcome.results[0].strategy, Strategy::Proportional);
    assert!(!outcome.results[3].is_found(), "malformed reference");
    assert!(!outcome.results[4].is_found(), "no French text for 4.1");

    claims::apply_alignments(&mut file.claims, &outcome.results, "fr");
    file.write(&claims_path)?;

    let reloaded = ClaimsFile::read(&claims_path)?;
    assert_eq!(reloaded.claims[0].excerpt("fr"), Some("Déjà traduit."));
    assert_eq!(reloaded.claims[3].excerpt("fr"), None);
    assert_eq!(reloaded.claims[4].excerpt("fr"), None);
    Ok(())
}

/// Test the verification report and reference correction over every outcome
#[tokio::test]
async fn test_verifyBatch_withFixReferences_shouldCorrectMisattribution() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let claims_path = common::create_claims_file(temp_dir.path(), common::sample_claims())?;
    let engine = Arc::new(Engine::with_defaults(common::sample_store(), "Ra")?);

    let mut file = ClaimsFile::read(&claims_path)?;
    let options = BatchOptions {
        concurrency: 2,
        ..BatchOptions::default()
    };
    let outcome = batch::verify_batch(engine, &file.claims, "en", &options, |_, _| {}).await?;
    let report = batch::verification_report(&file.claims, &outcome, "en");

    let statuses: Vec<ValidationStatus> = report.records.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ValidationStatus::Valid,
            ValidationStatus::WrongReference,
            ValidationStatus::QuoteNotFound,
            ValidationStatus::InvalidReference,
            ValidationStatus::Valid,
        ]
    );
    assert_eq!(report.corrections(), vec![("1.1", "2.3")]);
    assert_eq!(report.summary.count(ValidationStatus::Valid), 2);
    assert!(!report.summary.all_valid());

    let json = serde_json::to_value(&report.records)?;
    assert_eq!(json[1]["suggestedReference"], "2.3");
    assert!(json[0].get("suggestedReference").is_none());
    assert_eq!(json[0]["confidence"], "high");
    assert!(json[1].get("confidence").is_none());

    assert_eq!(claims::apply_corrections(&mut file.claims, &outcome.results), 1);
    file.write(&claims_path)?;
    assert_eq!(ClaimsFile::read(&claims_path)?.claims[1].reference, "2.3");
    Ok(())
}

/// Test that an elapsed deadline leaves a consistent, flagged report
#[tokio::test]
async fn test_verifyBatch_withElapsedDeadline_shouldFlagAbortedReport() -> Result<()> {
    let claims = common::sample_claims();
    let engine = Arc::new(Engine::with_defaults(common::sample_store(), "Ra")?);
    let options = BatchOptions {
        deadline_secs: Some(0),
        ..BatchOptions::default()
    };

    let outcome = batch::verify_batch(engine, &claims, "en", &options, |_, _| {}).await?;
    let report = batch::verification_report(&claims, &outcome, "en");

    assert!(outcome.aborted);
    assert!(report.aborted);
    assert_eq!(report.records.len(), outcome.results.len());
    assert!(report.records.len() < claims.len());
    Ok(())
}

/// Test generated excerpts for a unit that has no French text
#[tokio::test]
async fn test_generateMissing_thenApply_shouldMarkGeneratedLanguage() -> Result<()> {
    let engine = Engine::with_defaults(common::sample_store(), "Ra")?;
    let mut claims = common::sample_claims();
    let generator = MockGenerator::new(MockBehavior::Working);

    let generated =
        batch::generate_missing(&engine, &claims, "en", "fr", &generator, &BatchOptions::default()).await?;

    // Only 4.1 lacks a French unit text; "42" is malformed
    assert_eq!(generated.len(), 1);
    assert_eq!(generator.request_count(), 1);

    assert_eq!(claims::apply_generated(&mut claims, &generated, "fr"), 1);
    assert_eq!(
        claims[4].excerpt("fr"),
        Some("[French] The third density is the density of choice.")
    );
    assert!(claims[4].generated.contains("fr"));
    assert!(claims[0].generated.is_empty());
    Ok(())
}

/// Test that a failing generator surfaces as an error
#[tokio::test]
async fn test_generateMissing_withFailingGenerator_shouldFail() -> Result<()> {
    let engine = Engine::with_defaults(common::sample_store(), "Ra")?;
    let generator = MockGenerator::failing();

    let result =
        batch::generate_missing(&engine, &common::sample_claims(), "en", "fr", &generator, &BatchOptions::default())
            .await;

    assert!(result.is_err());
    Ok(())
}
