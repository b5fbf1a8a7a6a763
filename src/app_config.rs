use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::alignment::AlignmentConfig;
use crate::batch::BatchOptions;
use crate::language_utils::{canonical_code, get_language_name};
use crate::text::profile::{DEFAULT_MIN_SENTENCE_CHARS, LanguageProfile, LanguageRegistry};
use crate::validation::VerificationConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Name of the speaking entity, substituted into greeting templates
    #[serde(default = "default_entity")]
    pub entity: String,

    /// Extra language profiles; replace built-ins with the same code
    #[serde(default)]
    pub languages: Vec<LanguageProfile>,

    /// Alignment strategy settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Corpus verification settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Sentence segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Batch execution settings
    #[serde(default)]
    pub batch: BatchOptions,

    /// Translation generator for excerpts without a human translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<TranslatorConfig>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Sentence segmentation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Sentences shorter than this are not alignable; applies to built-in
    /// profiles
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: default_min_sentence_chars(),
        }
    }
}

/// Ollama translation generator configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslatorConfig {
    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Model name (e.g., "llama3.2:3b", "mistral")
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries on connection failures and server errors
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff between retries
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "fr".to_string()
}

fn default_entity() -> String {
    "Ra".to_string()
}

fn default_min_sentence_chars() -> usize {
    DEFAULT_MIN_SENTENCE_CHARS
}

fn default_ollama_endpoint() -> String {
    crate::providers::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Config {
    /// Load a configuration file, writing a default one when it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        get_language_name(&self.source_language)
            .with_context(|| format!("Invalid source language '{}'", self.source_language))?;
        get_language_name(&self.target_language)
            .with_context(|| format!("Invalid target language '{}'", self.target_language))?;

        for profile in &self.languages {
            canonical_code(&profile.code)
                .with_context(|| format!("Invalid language profile code '{}'", profile.code))?;
            if profile.min_sentence_chars == 0 {
                return Err(anyhow!("Profile '{}' must have min_sentence_chars > 0", profile.code));
            }
        }

        if self.segmentation.min_sentence_chars == 0 {
            return Err(anyhow!("segmentation.min_sentence_chars must be greater than zero"));
        }

        self.alignment.validate().context("Invalid alignment settings")?;
        self.verification.validate().context("Invalid verification settings")?;
        self.batch.validate().context("Invalid batch settings")?;

        if let Some(translator) = &self.translator {
            if translator.model.trim().is_empty() {
                return Err(anyhow!("translator.model must not be empty"));
            }
            if translator.timeout_secs == 0 {
                return Err(anyhow!("translator.timeout_secs must be greater than zero"));
            }
        }

        Ok(())
    }

    /// Language profiles: built-ins for the entity, then configured overrides
    pub fn registry(&self) -> Result<LanguageRegistry> {
        let builtin = LanguageRegistry::builtin(&self.entity)?;
        let mut registry = LanguageRegistry::new();
        for code in builtin.codes() {
            if let Some(profile) = builtin.get(code) {
                registry.register(
                    profile
                        .clone()
                        .with_min_sentence_chars(self.segmentation.min_sentence_chars),
                );
            }
        }
        for profile in &self.languages {
            registry.register(profile.clone());
        }
        Ok(registry)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            entity: default_entity(),
            languages: Vec::new(),
            alignment: AlignmentConfig::default(),
            verification: VerificationConfig::default(),
            segmentation: SegmentationConfig::default(),
            batch: BatchOptions::default(),
            translator: None,
            log_level: LogLevel::default(),
        }
    }
}
