use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use citesight_common::{CiteSightError, SimulationResult};

/// One recommendation-simulation request: would an assistant recommend
/// `brand` when asked for a `category` for `use_case`?
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub brand: String,
    pub category: String,
    pub use_case: String,
    /// Page-derived excerpt supplied as grounding context, when available.
    pub page_context: Option<String>,
}

/// Provider failures are distinguishable so the caller can decide to
/// proceed without a result instead of failing the analysis. No retries
/// happen at this layer.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("provider response could not be parsed: {0}")]
    Parse(String),

    #[error("simulation timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Simulator: Send + Sync {
    /// Provider id, for logging only.
    fn provider(&self) -> &'static str;

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError>;
}

/// What the attribute pass asks a provider to return.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MissingSignals {
    /// Attributes the model says it needs before recommending the brand.
    #[serde(default)]
    pub signals: Vec<String>,
}

/// Configured simulation backend. `None` is a real selection, not a
/// fallback: it makes the caller skip simulation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
    Ollama,
    None,
}

impl Provider {
    /// Strict parse: an unknown provider is a configuration error, never
    /// silently mapped to a default.
    pub fn parse(s: &str) -> Result<Self, CiteSightError> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            "none" => Ok(Provider::None),
            other => Err(CiteSightError::UnknownProvider(other.to_string())),
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4o",
            Provider::Ollama => "llama3.1",
            Provider::None => "",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAi => write!(f, "openai"),
            Provider::Ollama => write!(f, "ollama"),
            Provider::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parse_accepts_known_ids() {
        assert_eq!(Provider::parse("anthropic").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::parse("Claude").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::parse("openai").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::parse("OLLAMA").unwrap(), Provider::Ollama);
        assert_eq!(Provider::parse("none").unwrap(), Provider::None);
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let err = Provider::parse("bard").unwrap_err();
        assert!(matches!(err, CiteSightError::UnknownProvider(p) if p == "bard"));
    }
}
