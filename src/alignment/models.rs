/*!
 * Result types produced by the alignment engine.
 */

use serde::{Deserialize, Serialize};

/// Alignment strategy that produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Proportional sentence-index mapping
    Proportional,
    /// Character-offset proportional mapping
    CharOffset,
    /// Lead-span fallback for monologue excerpts
    LeadSpan,
    /// No strategy produced an adequate span
    None,
}

impl Strategy {
    /// Strategies in the order the orchestrator tries them
    pub const PRIORITY: [Strategy; 3] = [Strategy::Proportional, Strategy::CharOffset, Strategy::LeadSpan];

    /// Lowercase identifier used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::CharOffset => "char_offset",
            Self::LeadSpan => "lead_span",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "proportional" | "a" => Ok(Self::Proportional),
            "char_offset" | "b" => Ok(Self::CharOffset),
            "lead_span" | "c" => Ok(Self::LeadSpan),
            _ => Err(anyhow::anyhow!("Invalid alignment strategy: {}", s)),
        }
    }
}

/// Confidence grade of an aligned span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Outcome of aligning one excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Aligned target-language span, if any strategy succeeded
    pub text: Option<String>,
    /// Strategy that produced the span
    pub strategy: Strategy,
    /// Confidence derived from the strategy
    pub confidence: Option<Confidence>,
}

impl AlignmentResult {
    /// Result for a span accepted from the given strategy
    pub fn found(text: String, strategy: Strategy) -> Self {
        Self {
            confidence: super::confidence::classify(strategy),
            text: Some(text),
            strategy,
        }
    }

    /// Result when nothing adequate was found
    pub fn absent() -> Self {
        Self {
            text: None,
            strategy: Strategy::None,
            confidence: None,
        }
    }

    /// Whether a span was found
    pub fn is_found(&self) -> bool {
        self.text.is_some()
    }
}
