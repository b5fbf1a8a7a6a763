/*!
 * Lexical signatures and coverage.
 *
 * The signature of an excerpt is the first few of its longer words. Coverage
 * is the fraction of those words that occur (as substrings) in a candidate
 * unit, a cheap lexical-overlap proxy that tolerates small edits between the
 * quoted and the stored wording.
 */

use crate::text::normalizer::fold_case;

use super::VerificationConfig;

/// Bounded set of an excerpt's longer words, case-folded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalSignature {
    tokens: Vec<String>,
    folded_excerpt: String,
}

impl LexicalSignature {
    /// Build the signature of a normalized excerpt
    pub fn new(normalized_excerpt: &str, config: &VerificationConfig) -> Self {
        let folded_excerpt = fold_case(normalized_excerpt.trim());
        let tokens = folded_excerpt
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| token.chars().count() >= config.min_token_chars)
            .take(config.signature_size)
            .map(str::to_string)
            .collect();

        Self { tokens, folded_excerpt }
    }

    /// Signature tokens in excerpt order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Fraction of signature tokens present in the case-folded text.
    ///
    /// Always in `[0, 1]`. An excerpt without long words scores 1.0 when it
    /// occurs verbatim and 0.0 otherwise.
    pub fn coverage(&self, folded_text: &str) -> f64 {
        if self.tokens.is_empty() {
            let present = !self.folded_excerpt.is_empty() && folded_text.contains(&self.folded_excerpt);
            return if present { 1.0 } else { 0.0 };
        }

        let found = self
            .tokens
            .iter()
            .filter(|token| folded_text.contains(token.as_str()))
            .count();
        found as f64 / self.tokens.len() as f64
    }

    /// First signature token present in the text, or the whole excerpt
    pub fn first_match(&self, folded_text: &str) -> Option<&str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .find(|token| folded_text.contains(token))
            .or_else(|| {
                (!self.folded_excerpt.is_empty() && folded_text.contains(&self.folded_excerpt))
                    .then_some(self.folded_excerpt.as_str())
            })
    }
}
