/*!
 * Translation generator implementations.
 *
 * A generator produces *new* target-language text for excerpts whose unit
 * has no human translation yet. The alignment engine never calls one; the
 * output is opaque text, handled exactly like a human translation.
 *
 * - Ollama: local LLM server
 * - Mock: deterministic generator for tests and dry runs
 */

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::ProviderError;

/// Black-box text translator
#[async_trait]
pub trait TranslationGenerator: Send + Sync + Debug {
    /// Translate every value of `texts` into the named language.
    ///
    /// # Arguments
    /// * `texts` - Texts to translate, by caller-chosen key
    /// * `language_name` - Human readable target language ("French")
    ///
    /// # Returns
    /// * A map with exactly the keys of `texts`, or an error
    async fn translate(
        &self,
        texts: &BTreeMap<String, String>,
        language_name: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError>;

    /// Test the connection to the generator
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Keep the requested keys of a generator reply, failing on any gap
pub fn complete_translations(
    requested: &BTreeMap<String, String>,
    mut reply: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ProviderError> {
    let mut translations = BTreeMap::new();
    for key in requested.keys() {
        match reply.remove(key).filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                translations.insert(key.clone(), text.trim().to_string());
            }
            None => {
                return Err(ProviderError::ParseError(format!(
                    "missing translation for key '{}'",
                    key
                )));
            }
        }
    }
    Ok(translations)
}

pub mod mock;
pub mod ollama;

pub use mock::{MockBehavior, MockGenerator};
pub use ollama::OllamaGenerator;
