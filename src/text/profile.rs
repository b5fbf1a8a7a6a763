/*!
 * Per-language text profiles.
 *
 * A `LanguageProfile` carries everything the normalizer and segmenter need
 * to know about one language: the speaker labels used in transcripts, the
 * entity's opening greeting and a display name. Profiles are built once at
 * startup and handed to every call by reference; nothing here is global or
 * mutable after construction.
 */

use std::collections::BTreeMap;

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::language_utils::{canonical_code, get_language_name};

/// Default minimum length for a retained sentence
pub const DEFAULT_MIN_SENTENCE_CHARS: usize = 10;

/// Text conventions for a single language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Language code (ISO 639-1 where one exists)
    pub code: String,

    /// Human readable language name, handed to the translation generator
    #[serde(default)]
    pub display_name: String,

    /// Speaker labels stripped at segment starts, without the trailing colon
    #[serde(default)]
    pub speaker_prefixes: Vec<String>,

    /// Opening greetings ("I am Ra.") removed from text starts and dropped
    /// as sentences
    #[serde(default)]
    pub greetings: Vec<String>,

    /// Sentences shorter than this many characters are not alignable
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

fn default_min_sentence_chars() -> usize {
    DEFAULT_MIN_SENTENCE_CHARS
}

impl LanguageProfile {
    /// Create a bare profile with no speaker labels or greetings
    pub fn new(code: &str) -> Result<Self> {
        let code = canonical_code(code)?;
        let display_name = get_language_name(&code)?;
        Ok(Self {
            code,
            display_name,
            speaker_prefixes: Vec::new(),
            greetings: Vec::new(),
            min_sentence_chars: DEFAULT_MIN_SENTENCE_CHARS,
        })
    }

    /// Add a speaker label
    pub fn with_speaker(mut self, label: impl Into<String>) -> Self {
        self.speaker_prefixes.push(label.into());
        self
    }

    /// Add an opening greeting
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greetings.push(greeting.into());
        self
    }

    /// Override the minimum sentence length
    pub fn with_min_sentence_chars(mut self, min: usize) -> Self {
        self.min_sentence_chars = min;
        self
    }
}

/// Built-in conventions: (code, speaker labels, greeting template)
const BUILTIN_PROFILES: &[(&str, &[&str], &str)] = &[
    ("en", &["Questioner"], "I am {entity}."),
    ("fr", &["Questionneur", "Intervenant"], "Je suis {entity}."),
    ("es", &["Interrogador", "Preguntador"], "Soy {entity}."),
    ("de", &["Fragesteller"], "Ich bin {entity}."),
    ("it", &["Interrogante"], "Io sono {entity}."),
    ("pt", &["Questionador", "Interrogador"], "Eu sou {entity}."),
];

/// Registry of language profiles, keyed by canonical code
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    profiles: BTreeMap<String, LanguageProfile>,
}

impl LanguageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in profiles for the given speaking entity.
    ///
    /// The entity name is both a speaker label and part of every greeting.
    pub fn builtin(entity: &str) -> Result<Self> {
        let mut registry = Self::new();
        for (code, speakers, greeting) in BUILTIN_PROFILES {
            let mut profile = LanguageProfile::new(code)?;
            for speaker in speakers.iter() {
                profile = profile.with_speaker(*speaker);
            }
            if !entity.is_empty() {
                profile = profile
                    .with_speaker(entity)
                    .with_greeting(greeting.replace("{entity}", entity));
            }
            registry.register(profile);
        }
        Ok(registry)
    }

    /// Register a profile, replacing any existing one for the same language
    pub fn register(&mut self, mut profile: LanguageProfile) {
        if let Ok(code) = canonical_code(&profile.code) {
            profile.code = code;
        }
        if profile.display_name.is_empty() {
            profile.display_name = get_language_name(&profile.code).unwrap_or_else(|_| profile.code.clone());
        }
        debug!("Registering language profile '{}'", profile.code);
        self.profiles.insert(profile.code.clone(), profile);
    }

    /// Look up the profile for a language code in any ISO format
    pub fn get(&self, code: &str) -> Option<&LanguageProfile> {
        let key = canonical_code(code).unwrap_or_else(|_| code.trim().to_lowercase());
        self.profiles.get(&key)
    }

    /// All registered codes in ascending order
    pub fn codes(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}
