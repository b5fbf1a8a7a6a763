/*!
 * Per-claim entry points over a document store.
 *
 * `Engine` resolves unit texts through a `UnitStore` and hands them to the
 * aligner or the verifier. Calls are independent of each other, so a batch
 * driver can run them in any order or in parallel and stop between any two.
 * Store failures are the only errors; every data-quality finding is a value.
 */

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::alignment::{Aligner, AlignmentConfig, AlignmentInput, AlignmentResult};
use crate::claims::ExcerptClaim;
use crate::corpus::{UnitKey, UnitStore};
use crate::errors::StoreError;
use crate::language_utils::canonical_code;
use crate::text::profile::{LanguageProfile, LanguageRegistry};
use crate::validation::{CorpusIndex, ValidationResult, VerificationConfig, Verifier};

/// Alignment and verification over one store
#[derive(Debug)]
pub struct Engine<S: UnitStore> {
    store: S,
    registry: LanguageRegistry,
    aligner: Aligner,
    verifier: Verifier,
    /// Verification indexes per language, built on first use
    indexes: RwLock<BTreeMap<String, Arc<CorpusIndex>>>,
}

impl<S: UnitStore> Engine<S> {
    /// Create an engine
    pub fn new(
        store: S,
        registry: LanguageRegistry,
        alignment: AlignmentConfig,
        verification: VerificationConfig,
    ) -> Self {
        Self {
            store,
            registry,
            aligner: Aligner::new(alignment),
            verifier: Verifier::new(verification),
            indexes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Engine with default settings and the built-in profiles for `entity`
    pub fn with_defaults(store: S, entity: &str) -> anyhow::Result<Self> {
        Ok(Self::new(
            store,
            LanguageRegistry::builtin(entity)?,
            AlignmentConfig::default(),
            VerificationConfig::default(),
        ))
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registered language profiles
    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Profile for a language; unregistered languages get a bare profile
    pub fn profile(&self, language: &str) -> Cow<'_, LanguageProfile> {
        match self.registry.get(language) {
            Some(profile) => Cow::Borrowed(profile),
            None => Cow::Owned(LanguageProfile::new(language).unwrap_or_else(|_| LanguageProfile {
                code: language.trim().to_lowercase(),
                display_name: language.to_string(),
                speaker_prefixes: Vec::new(),
                greetings: Vec::new(),
                min_sentence_chars: crate::text::profile::DEFAULT_MIN_SENTENCE_CHARS,
            })),
        }
    }

    /// Align a claim's source excerpt into the target language.
    ///
    /// Missing excerpts, malformed references and absent unit texts yield an
    /// absent result rather than an error.
    pub fn align_one(
        &self,
        claim: &ExcerptClaim,
        source_language: &str,
        target_language: &str,
    ) -> Result<AlignmentResult, StoreError> {
        let Some(excerpt) = claim.excerpt(source_language) else {
            debug!("{}: no '{}' excerpt to align", claim.label(), source_language);
            return Ok(AlignmentResult::absent());
        };

        let Ok(key) = UnitKey::parse(&claim.reference) else {
            debug!("{}: malformed reference '{}'", claim.label(), claim.reference);
            return Ok(AlignmentResult::absent());
        };

        let Some(source_full) = self.store.unit_text(&key, source_language)? else {
            debug!("{}: unit {} has no '{}' text", claim.label(), key, source_language);
            return Ok(AlignmentResult::absent());
        };
        let Some(target_full) = self.store.unit_text(&key, target_language)? else {
            debug!("{}: unit {} has no '{}' text", claim.label(), key, target_language);
            return Ok(AlignmentResult::absent());
        };

        let source_profile = self.profile(source_language);
        let target_profile = self.profile(target_language);
        let result = self.aligner.align(&AlignmentInput {
            excerpt,
            source_full: &source_full,
            target_full: &target_full,
            source_profile: &source_profile,
            target_profile: &target_profile,
            monologue: claim.monologue,
        });

        debug!("{}: aligned via {}", claim.label(), result.strategy);
        Ok(result)
    }

    /// Verify a claim's excerpt in `language` against the whole corpus
    pub fn verify_one(&self, claim: &ExcerptClaim, language: &str) -> Result<ValidationResult, StoreError> {
        let index = self.index(language)?;
        Ok(self.verifier.verify(&claim.reference, claim.excerpt(language), &index))
    }

    /// Verification index for a language, building it on first use
    pub fn index(&self, language: &str) -> Result<Arc<CorpusIndex>, StoreError> {
        let key = canonical_code(language).unwrap_or_else(|_| language.trim().to_lowercase());
        if let Some(index) = self.indexes.read().get(&key) {
            return Ok(Arc::clone(index));
        }

        // Built outside the lock; a concurrent build of the same language is
        // identical, so whichever lands first wins.
        let built = Arc::new(CorpusIndex::build(&self.store, &self.profile(language))?);
        let mut indexes = self.indexes.write();
        Ok(Arc::clone(indexes.entry(key).or_insert(built)))
    }

    /// Drop cached indexes after the store has changed
    pub fn invalidate(&self) {
        self.indexes.write().clear();
    }
}
