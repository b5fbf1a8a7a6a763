/*!
 * Mock generator implementations for testing.
 *
 * - `MockGenerator::working()` - Always succeeds with prefixed text
 * - `MockGenerator::intermittent(n)` - Fails every nth request
 * - `MockGenerator::failing()` - Always fails with an error
 * - `MockGenerator::incomplete()` - Drops the last key of every reply
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{TranslationGenerator, complete_translations};
use crate::errors::ProviderError;

/// Behavior mode for the mock generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds but omits one requested key
    Incomplete,
}

/// Deterministic generator: `"[<language>] <text>"`
#[derive(Debug, Clone)]
pub struct MockGenerator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl MockGenerator {
    /// Create a new mock generator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock generator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock generator
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock generator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that leaves out one key
    pub fn incomplete() -> Self {
        Self::new(MockBehavior::Incomplete)
    }

    /// Number of `translate` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn prefixed(texts: &BTreeMap<String, String>, language_name: &str) -> BTreeMap<String, String> {
        texts
            .iter()
            .map(|(key, text)| (key.clone(), format!("[{}] {}", language_name, text)))
            .collect()
    }
}

#[async_trait]
impl TranslationGenerator for MockGenerator {
    async fn translate(
        &self,
        texts: &BTreeMap<String, String>,
        language_name: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(Self::prefixed(texts, language_name)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::prefixed(texts, language_name))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated generator failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Incomplete => {
                let mut reply = Self::prefixed(texts, language_name);
                reply.pop_last();
                complete_translations(texts, reply)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
