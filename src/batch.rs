/*!
 * Batch processing of claims.
 *
 * Claims are independent, so a batch runs them concurrently on the blocking
 * pool, bounded by `concurrency`, and collects results in input order. An
 * optional deadline stops launching new claims; everything completed before
 * it stays valid and the outcome is flagged `aborted`. A store failure
 * aborts the whole batch.
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::alignment::AlignmentResult;
use crate::claims::ExcerptClaim;
use crate::corpus::{UnitKey, UnitStore};
use crate::engine::Engine;
use crate::errors::{AppError, StoreError};
use crate::providers::TranslationGenerator;
use crate::validation::{ReportRecord, ValidationResult, VerificationReport};

/// Batch execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Claims processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Stop launching claims after this many seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Excerpts sent to the translation generator per request
    #[serde(default = "default_generator_chunk_size")]
    pub generator_chunk_size: usize,
}

fn default_concurrency() -> usize {
    4
}

fn default_generator_chunk_size() -> usize {
    10
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            deadline_secs: None,
            generator_chunk_size: default_generator_chunk_size(),
        }
    }
}

impl BatchOptions {
    /// Deadline as a duration
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Check values are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            return Err(anyhow::anyhow!("batch concurrency must be greater than zero"));
        }
        if self.generator_chunk_size == 0 {
            return Err(anyhow::anyhow!("generator chunk size must be greater than zero"));
        }
        Ok(())
    }
}

/// Results of a batch, in claim order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    /// One result per completed claim; a prefix of the input when aborted
    pub results: Vec<T>,
    /// The deadline stopped the batch before every claim ran
    pub aborted: bool,
    /// Wall time of the batch
    pub elapsed: Duration,
}

fn check_options(options: &BatchOptions) -> Result<(), AppError> {
    options
        .validate()
        .map_err(|e| AppError::Config(e.to_string()))
}

/// Run `job` for claim indices `0..total`, keeping input order
async fn run_batch<T, F>(
    total: usize,
    options: &BatchOptions,
    progress: impl Fn(usize, usize),
    job: F,
) -> Result<BatchOutcome<T>, AppError>
where
    T: Send + 'static,
    F: Fn(usize) -> Result<T, StoreError> + Send + Sync + 'static,
{
    check_options(options)?;
    let started = Instant::now();
    let deadline = options.deadline().map(|d| started + d);
    let job = Arc::new(job);

    let mut pending = stream::iter(0..total)
        .take_while(move |_| futures::future::ready(deadline.is_none_or(|d| Instant::now() < d)))
        .map(|index| {
            let job = Arc::clone(&job);
            tokio::task::spawn_blocking(move || job(index))
        })
        .buffered(options.concurrency);

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = pending.next().await {
        let result = joined.map_err(|e| AppError::Unknown(format!("Batch worker failed: {}", e)))??;
        results.push(result);
        progress(results.len(), total);
    }

    let aborted = results.len() < total;
    if aborted {
        warn!("Deadline reached after {} of {} claims", results.len(), total);
    }

    Ok(BatchOutcome {
        results,
        aborted,
        elapsed: started.elapsed(),
    })
}

/// Align every claim from `source_language` into `target_language`
pub async fn align_batch<S>(
    engine: Arc<Engine<S>>,
    claims: &[ExcerptClaim],
    source_language: &str,
    target_language: &str,
    options: &BatchOptions,
    progress: impl Fn(usize, usize),
) -> Result<BatchOutcome<AlignmentResult>, AppError>
where
    S: UnitStore + 'static,
{
    info!(
        "Aligning {} claims {} -> {} ({} at a time)",
        claims.len(),
        source_language,
        target_language,
        options.concurrency
    );

    let claims = Arc::new(claims.to_vec());
    let source = source_language.to_string();
    let target = target_language.to_string();
    let total = claims.len();

    let outcome = run_batch(total, options, progress, move |index| {
        engine.align_one(&claims[index], &source, &target)
    })
    .await?;

    let found = outcome.results.iter().filter(|r| r.is_found()).count();
    info!("Aligned {} of {} claims in {:?}", found, outcome.results.len(), outcome.elapsed);
    Ok(outcome)
}

/// Verify every claim's excerpt in `language`
pub async fn verify_batch<S>(
    engine: Arc<Engine<S>>,
    claims: &[ExcerptClaim],
    language: &str,
    options: &BatchOptions,
    progress: impl Fn(usize, usize),
) -> Result<BatchOutcome<ValidationResult>, AppError>
where
    S: UnitStore + 'static,
{
    info!("Verifying {} claims in '{}'", claims.len(), language);

    // Build the index once up front instead of racing workers for it
    let index_engine = Arc::clone(&engine);
    let index_language = language.to_string();
    tokio::task::spawn_blocking(move || index_engine.index(&index_language).map(|_| ()))
        .await
        .map_err(|e| AppError::Unknown(format!("Index worker failed: {}", e)))??;

    let claims = Arc::new(claims.to_vec());
    let language = language.to_string();
    let total = claims.len();

    let outcome = run_batch(total, options, progress, move |index| {
        engine.verify_one(&claims[index], &language)
    })
    .await?;

    info!("Verified {} claims in {:?}", outcome.results.len(), outcome.elapsed);
    Ok(outcome)
}

/// Flat report for a verification batch
pub fn verification_report(
    claims: &[ExcerptClaim],
    outcome: &BatchOutcome<ValidationResult>,
    language: &str,
) -> VerificationReport {
    let records = claims
        .iter()
        .zip(&outcome.results)
        .map(|(claim, result)| ReportRecord::new(claim.id.clone(), claim.reference.clone(), result))
        .collect();
    VerificationReport::new(language, records, outcome.aborted)
}

/// Generate target excerpts for claims whose unit has no target text.
///
/// Only claims with a source excerpt, a well-formed reference and no target
/// excerpt are sent. Returns generated text by claim position.
pub async fn generate_missing<S, G>(
    engine: &Engine<S>,
    claims: &[ExcerptClaim],
    source_language: &str,
    target_language: &str,
    generator: &G,
    options: &BatchOptions,
) -> Result<BTreeMap<usize, String>, AppError>
where
    S: UnitStore,
    G: TranslationGenerator + ?Sized,
{
    check_options(options)?;
    let mut wanted: BTreeMap<String, String> = BTreeMap::new();
    for (index, claim) in claims.iter().enumerate() {
        if claim.excerpt(target_language).is_some() {
            continue;
        }
        let Some(excerpt) = claim.excerpt(source_language) else {
            continue;
        };
        let Ok(key) = UnitKey::parse(&claim.reference) else {
            warn!("{}: skipping malformed reference '{}'", claim.label(), claim.reference);
            continue;
        };
        if engine.store().unit_text(&key, target_language)?.is_some() {
            debug!("{}: unit {} has a human translation; align instead", claim.label(), key);
            continue;
        }
        wanted.insert(index.to_string(), excerpt.to_string());
    }

    if wanted.is_empty() {
        info!("No claims need generated '{}' excerpts", target_language);
        return Ok(BTreeMap::new());
    }

    let language_name = engine.profile(target_language).display_name.clone();
    info!("Generating {} '{}' excerpts", wanted.len(), target_language);

    let entries: Vec<(String, String)> = wanted.into_iter().collect();
    let mut generated = BTreeMap::new();
    for chunk in entries.chunks(options.generator_chunk_size) {
        let request: BTreeMap<String, String> = chunk.iter().cloned().collect();
        let translations = generator.translate(&request, &language_name).await?;
        for (key, text) in translations {
            if let Ok(index) = key.parse::<usize>() {
                generated.insert(index, text);
            }
        }
    }

    Ok(generated)
}
