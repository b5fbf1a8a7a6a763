// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use excerpt_align::alignment::Strategy;
use excerpt_align::app_config::{self, Config};
use excerpt_align::batch;
use excerpt_align::claims::{self, ClaimsFile, ExcerptClaim};
use excerpt_align::corpus::{self, UnitStore};
use excerpt_align::database::SqliteStore;
use excerpt_align::engine::Engine;
use excerpt_align::providers::{OllamaGenerator, TranslationGenerator};
use excerpt_align::{AlignmentResult, Confidence};

/// Store shared by every command
type SharedStore = Arc<dyn UnitStore>;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Where unit texts are read from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct StoreArgs {
    /// JSON corpus file, or a directory of corpus files
    #[arg(long, value_name = "PATH")]
    corpus: Option<PathBuf>,

    /// SQLite corpus database created by `import`
    #[arg(long, value_name = "DB")]
    db: Option<PathBuf>,
}

/// Batch overrides shared by the batch commands
#[derive(Args, Debug)]
struct BatchArgs {
    /// Claims processed at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Stop launching claims after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align each claim's source excerpt into the target language
    Align(AlignArgs),

    /// Check each claim's excerpt against the corpus
    Verify(VerifyArgs),

    /// Load a JSON corpus into a SQLite database
    Import(ImportArgs),

    /// Write a SQLite database back out as a JSON corpus file
    Export(ExportArgs),

    /// Generate excerpts for claims whose unit has no target-language text
    TranslateMissing(TranslateArgs),

    /// Generate shell completions for excerpt-align
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct AlignArgs {
    /// Claims file
    #[arg(long, value_name = "FILE")]
    claims: PathBuf,

    #[command(flatten)]
    store: StoreArgs,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Only run these strategies (proportional, char_offset, lead_span)
    #[arg(long, value_delimiter = ',')]
    strategies: Option<Vec<String>>,

    /// Write aligned excerpts back into the claims file
    #[arg(short, long)]
    write: bool,

    /// Write alignment results as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Parser, Debug)]
struct VerifyArgs {
    /// Claims file
    #[arg(long, value_name = "FILE")]
    claims: PathBuf,

    #[command(flatten)]
    store: StoreArgs,

    /// Language whose excerpts are checked (defaults to the source language)
    #[arg(short, long)]
    language: Option<String>,

    /// Write the report as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Rewrite misattributed references in the claims file
    #[arg(long)]
    fix_references: bool,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// JSON corpus file, or a directory of corpus files
    #[arg(long, value_name = "PATH")]
    corpus: PathBuf,

    /// Target database (defaults to the user data directory)
    #[arg(long, value_name = "DB")]
    db: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Source database (defaults to the user data directory)
    #[arg(long, value_name = "DB")]
    db: Option<PathBuf>,

    /// Output corpus file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Claims file
    #[arg(long, value_name = "FILE")]
    claims: PathBuf,

    #[command(flatten)]
    store: StoreArgs,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Ollama model name
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Write generated excerpts back into the claims file
    #[arg(short, long)]
    write: bool,
}

/// excerpt-align - Cross-lingual excerpt alignment and validation
///
/// Locates quoted excerpts in independently produced translations and
/// audits cited excerpts against the corpus they claim to come from.
#[derive(Parser, Debug)]
#[command(name = "excerpt-align")]
#[command(version)]
#[command(about = "Cross-lingual excerpt alignment and validation")]
#[command(long_about = "excerpt-align finds the counterpart of a quoted excerpt in another language's
version of the same unit, and verifies that cited excerpts exist where they say.

EXAMPLES:
    excerpt-align align --claims glossary.json --corpus corpus/ -t fr --write
    excerpt-align verify --claims glossary.json --db corpus.db -o report.json
    excerpt-align verify --claims glossary.json --corpus corpus/ --fix-references
    excerpt-align import --corpus corpus/ --db corpus.db
    excerpt-align export --db corpus.db -o corpus.json
    excerpt-align translate-missing --claims glossary.json --db corpus.db -t es --write
    excerpt-align completions bash > excerpt-align.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, visible_alias = "config", default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger; the effective level is `log::max_level`
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the config or --log-level adjusts it once loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "excerpt-align", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;

    match cli.command {
        Commands::Align(args) => run_align(config, args).await,
        Commands::Verify(args) => run_verify(config, args).await,
        Commands::Import(args) => run_import(args),
        Commands::Export(args) => run_export(args),
        Commands::TranslateMissing(args) => run_translate_missing(config, args).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration and apply the log level
fn load_config(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli_log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(config_path))?;

    if let Some(level) = cli_log_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

/// Apply batch overrides from the command line
fn apply_batch_args(config: &mut Config, args: &BatchArgs) {
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }
    if let Some(deadline) = args.deadline {
        config.batch.deadline_secs = Some(deadline);
    }
}

/// Open the store selected on the command line
fn open_store(args: &StoreArgs) -> Result<SharedStore> {
    match (&args.corpus, &args.db) {
        (Some(corpus), _) => Ok(Arc::new(corpus::load_corpus(corpus)?)),
        (None, Some(db)) => {
            if !db.exists() {
                return Err(anyhow!("Database does not exist: {:?}", db));
            }
            info!("Opening corpus database {:?}", db);
            Ok(Arc::new(SqliteStore::open(db)?))
        }
        (None, None) => Err(anyhow!("Either --corpus or --db is required")),
    }
}

/// Build the engine for a validated configuration
fn build_engine(config: &Config, store: SharedStore) -> Result<Arc<Engine<SharedStore>>> {
    config.validate().context("Configuration validation failed")?;
    Ok(Arc::new(Engine::new(
        store,
        config.registry()?,
        config.alignment.clone(),
        config.verification.clone(),
    )))
}

/// Progress bar for a batch of `total` claims
fn progress_bar(total: usize, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Write JSON to a file
fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write output file: {:?}", path))?;
    info!("Wrote {:?}", path);
    Ok(())
}

/// One line of `align` output
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AlignmentRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<Confidence>,
}

impl<'a> AlignmentRecord<'a> {
    fn new(claim: &'a ExcerptClaim, result: &'a AlignmentResult) -> Self {
        Self {
            id: claim.id.as_deref(),
            reference: &claim.reference,
            text: result.text.as_deref(),
            strategy: result.strategy,
            confidence: result.confidence,
        }
    }
}

async fn run_align(mut config: Config, args: AlignArgs) -> Result<()> {
    if let Some(source) = &args.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &args.target_language {
        config.target_language = target.clone();
    }
    if let Some(names) = &args.strategies {
        config.alignment.enabled_strategies = names
            .iter()
            .map(|name| name.parse::<Strategy>())
            .collect::<Result<Vec<_>>>()?;
    }
    apply_batch_args(&mut config, &args.batch);

    let mut claims_file = ClaimsFile::read(&args.claims)?;
    let engine = build_engine(&config, open_store(&args.store)?)?;

    let bar = progress_bar(claims_file.claims.len(), "aligning");
    let progress = {
        let bar = bar.clone();
        move |done: usize, _total: usize| bar.set_position(done as u64)
    };
    let outcome = batch::align_batch(
        engine,
        &claims_file.claims,
        &config.source_language,
        &config.target_language,
        &config.batch,
        progress,
    )
    .await?;
    bar.finish_and_clear();

    let found = outcome.results.iter().filter(|r| r.is_found()).count();
    info!(
        "{} of {} claims aligned into '{}'{}",
        found,
        outcome.results.len(),
        config.target_language,
        if outcome.aborted { " (stopped at deadline)" } else { "" }
    );

    if let Some(output) = &args.output {
        let records: Vec<AlignmentRecord> = claims_file
            .claims
            .iter()
            .zip(&outcome.results)
            .map(|(claim, result)| AlignmentRecord::new(claim, result))
            .collect();
        write_json(output, &records)?;
    }

    if args.write {
        let filled = claims::apply_alignments(&mut claims_file.claims, &outcome.results, &config.target_language);
        if filled > 0 {
            claims_file.write(&args.claims)?;
        }
    }

    Ok(())
}

async fn run_verify(mut config: Config, args: VerifyArgs) -> Result<()> {
    let language = args.language.clone().unwrap_or_else(|| config.source_language.clone());
    apply_batch_args(&mut config, &args.batch);

    let mut claims_file = ClaimsFile::read(&args.claims)?;
    let engine = build_engine(&config, open_store(&args.store)?)?;

    let bar = progress_bar(claims_file.claims.len(), "verifying");
    let progress = {
        let bar = bar.clone();
        move |done: usize, _total: usize| bar.set_position(done as u64)
    };
    let outcome = batch::verify_batch(engine, &claims_file.claims, &language, &config.batch, progress).await?;
    bar.finish_and_clear();

    let report = batch::verification_report(&claims_file.claims, &outcome, &language);
    info!("{}", report.summary_line());
    for (reference, suggested) in report.corrections() {
        warn!("Misattributed: {} -> {}", reference, suggested);
    }

    match &args.output {
        Some(output) => write_json(output, &report)?,
        None => println!(
            "{}",
            serde_json::to_string_pretty(&report.records).context("Failed to serialize report")?
        ),
    }

    if args.fix_references {
        let corrected = claims::apply_corrections(&mut claims_file.claims, &outcome.results);
        if corrected > 0 {
            claims_file.write(&args.claims)?;
        }
        info!("Corrected {} references", corrected);
    }

    Ok(())
}

fn run_import(args: ImportArgs) -> Result<()> {
    let memory = corpus::load_corpus(&args.corpus)?;
    let store = match &args.db {
        Some(db) => SqliteStore::open(db)?,
        None => SqliteStore::new_default()?,
    };

    let stats = store.import_units(&memory.units())?;
    info!("Imported into {:?}: {}", store.connection().path(), stats);

    let db_stats = store.connection().stats()?;
    info!(
        "Database now holds {} texts for {} units in {} languages ({} bytes)",
        db_stats.text_count, db_stats.unit_count, db_stats.language_count, db_stats.file_size_bytes
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let store = match &args.db {
        Some(db) => SqliteStore::open(db)?,
        None => SqliteStore::new_default()?,
    };

    let file = corpus::CorpusFile {
        units: store.export_units()?,
    };
    file.write(&args.output)?;
    info!(
        "Exported {} units ({}) to {:?}",
        file.units.len(),
        store.languages()?.join(", "),
        args.output
    );
    Ok(())
}

async fn run_translate_missing(mut config: Config, args: TranslateArgs) -> Result<()> {
    if let Some(source) = &args.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &args.target_language {
        config.target_language = target.clone();
    }
    let mut translator = config.translator.clone().unwrap_or_default();
    if let Some(model) = &args.model {
        translator.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        translator.endpoint = endpoint.clone();
    }
    config.translator = Some(translator.clone());

    let mut claims_file = ClaimsFile::read(&args.claims)?;
    let engine = build_engine(&config, open_store(&args.store)?)?;

    let generator = OllamaGenerator::new(
        &translator.endpoint,
        translator.model.clone(),
        Duration::from_secs(translator.timeout_secs),
    )?
    .with_retries(translator.retry_count, translator.retry_backoff_ms)
    .with_temperature(translator.temperature);

    generator
        .test_connection()
        .await
        .with_context(|| format!("Cannot reach Ollama at {}", generator.base_url()))?;

    let generated = batch::generate_missing(
        &*engine,
        &claims_file.claims,
        &config.source_language,
        &config.target_language,
        &generator,
        &config.batch,
    )
    .await?;

    for (index, text) in &generated {
        if let Some(claim) = claims_file.claims.get(*index) {
            println!("{}\t{}", claim.label(), text);
        }
    }

    if args.write {
        let filled = claims::apply_generated(&mut claims_file.claims, &generated, &config.target_language);
        if filled > 0 {
            claims_file.write(&args.claims)?;
        }
        info!("Stored {} generated '{}' excerpts", filled, config.target_language);
    }

    Ok(())
}
