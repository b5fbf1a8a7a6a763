/*!
 * Strategy orchestration.
 *
 * Runs the enabled strategies in fixed priority order and accepts the first
 * span long enough to be meaningful. Each caller configures which
 * strategies are enabled; the chain itself is shared.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::char_offset::align_by_char_offset;
use super::lead_span::align_by_lead_span;
use super::models::{AlignmentResult, Strategy};
use super::proportional::align_by_sentence_index;
use crate::text::normalizer::normalize;
use crate::text::profile::LanguageProfile;
use crate::text::segmenter::{segment, segment_excerpt};

/// Configuration for the alignment engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Accepted spans must be longer than this many characters
    #[serde(default = "default_min_result_chars")]
    pub min_result_chars: usize,

    /// Characters of a sentence used for prefix containment
    #[serde(default = "default_opener_chars")]
    pub opener_chars: usize,

    /// Characters compared for an exact leading-prefix match
    #[serde(default = "default_prefix_match_chars")]
    pub prefix_match_chars: usize,

    /// Fraction of excerpt sentences that must verify in sequence
    #[serde(default = "default_continuity_ratio")]
    pub continuity_ratio: f64,

    /// Characters of the excerpt searched for in the source text
    #[serde(default = "default_offset_probe_chars")]
    pub offset_probe_chars: usize,

    /// How far the offset window start may move to reach a boundary
    #[serde(default = "default_boundary_slack_chars")]
    pub boundary_slack_chars: usize,

    /// Strategies to run; order in this list is ignored
    #[serde(default = "default_enabled_strategies")]
    pub enabled_strategies: Vec<Strategy>,
}

fn default_min_result_chars() -> usize {
    15
}

fn default_opener_chars() -> usize {
    50
}

fn default_prefix_match_chars() -> usize {
    30
}

fn default_continuity_ratio() -> f64 {
    0.8
}

fn default_offset_probe_chars() -> usize {
    50
}

fn default_boundary_slack_chars() -> usize {
    20
}

fn default_enabled_strategies() -> Vec<Strategy> {
    Strategy::PRIORITY.to_vec()
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            min_result_chars: default_min_result_chars(),
            opener_chars: default_opener_chars(),
            prefix_match_chars: default_prefix_match_chars(),
            continuity_ratio: default_continuity_ratio(),
            offset_probe_chars: default_offset_probe_chars(),
            boundary_slack_chars: default_boundary_slack_chars(),
            enabled_strategies: default_enabled_strategies(),
        }
    }
}

impl AlignmentConfig {
    /// Restrict the chain to the given strategies
    pub fn with_strategies(mut self, strategies: &[Strategy]) -> Self {
        self.enabled_strategies = strategies.to_vec();
        self
    }

    /// Check thresholds are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.continuity_ratio <= 0.0 || self.continuity_ratio > 1.0 {
            return Err(anyhow::anyhow!(
                "continuity_ratio must be in (0, 1], got {}",
                self.continuity_ratio
            ));
        }
        if self.opener_chars == 0 || self.prefix_match_chars == 0 || self.offset_probe_chars == 0 {
            return Err(anyhow::anyhow!("alignment prefix sizes must be greater than zero"));
        }
        if !self.enabled_strategies.iter().any(|s| *s != Strategy::None) {
            return Err(anyhow::anyhow!("at least one alignment strategy must be enabled"));
        }
        Ok(())
    }

    fn is_enabled(&self, strategy: Strategy) -> bool {
        self.enabled_strategies.contains(&strategy)
    }
}

/// Everything needed to align one excerpt
#[derive(Debug, Clone, Copy)]
pub struct AlignmentInput<'a> {
    /// Source-language excerpt, raw
    pub excerpt: &'a str,
    /// Full source-language unit text, raw
    pub source_full: &'a str,
    /// Full target-language unit text, raw
    pub target_full: &'a str,
    /// Profile of the source language
    pub source_profile: &'a LanguageProfile,
    /// Profile of the target language
    pub target_profile: &'a LanguageProfile,
    /// Caller asserts the excerpt comes from an uninterrupted opening monologue
    pub monologue: bool,
}

/// Runs the strategy chain over one input at a time
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignmentConfig,
}

impl Aligner {
    /// Create an aligner with the given configuration
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Align an excerpt against the target unit text.
    ///
    /// Pure function of its input; never fails.
    pub fn align(&self, input: &AlignmentInput<'_>) -> AlignmentResult {
        let excerpt = normalize(input.excerpt, input.source_profile);
        let source = normalize(input.source_full, input.source_profile);
        let target = normalize(input.target_full, input.target_profile);

        let excerpt_sentences = segment_excerpt(&excerpt, input.source_profile);
        let source_sentences = segment(&source, input.source_profile);
        let target_sentences = segment(&target, input.target_profile);

        for strategy in Strategy::PRIORITY {
            if !self.config.is_enabled(strategy) {
                continue;
            }

            let candidate = match strategy {
                Strategy::Proportional => align_by_sentence_index(
                    &excerpt_sentences,
                    &source_sentences,
                    &target_sentences,
                    &self.config,
                ),
                Strategy::CharOffset => align_by_char_offset(&excerpt, &source, &target, &self.config),
                Strategy::LeadSpan if input.monologue => {
                    align_by_lead_span(&excerpt_sentences, &target_sentences)
                }
                Strategy::LeadSpan | Strategy::None => None,
            };

            match candidate.map(|text| text.trim().to_string()) {
                Some(text) if text.chars().count() > self.config.min_result_chars => {
                    debug!("Strategy '{}' accepted a {}-char span", strategy, text.chars().count());
                    return AlignmentResult::found(text, strategy);
                }
                Some(text) => {
                    debug!("Strategy '{}' span too short ({} chars)", strategy, text.chars().count());
                }
                None => debug!("Strategy '{}' found nothing", strategy),
            }
        }

        AlignmentResult::absent()
    }
}
