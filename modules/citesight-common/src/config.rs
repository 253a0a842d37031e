use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::error::CiteSightError;

/// Weight sums may exceed 1.0 only by floating-point noise.
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// Explicit configuration for one analysis run. Constructed by the caller
/// and passed into the pipeline; there is no process-wide config state.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Engine id → non-negative nominal weight. Weights are renormalized
    /// over the engines actually run, so the table may sum to less than 1.0.
    pub weights: BTreeMap<String, f64>,
    /// Engine ids to run, in registry order.
    pub enabled_engines: Vec<String>,
    /// Simulation provider: "anthropic", "openai", "ollama", or "none".
    pub provider: String,
    /// Provider model identifier. None applies the provider default.
    pub model: Option<String>,
    /// API key for cloud providers.
    pub api_key: Option<String>,
    pub ollama_base_url: String,
    /// Bound on one simulation call.
    pub sim_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("ade".to_string(), 0.30);
        weights.insert("arce".to_string(), 0.20);
        weights.insert("tre".to_string(), 0.20);
        Self {
            weights,
            enabled_engines: vec!["ade".to_string(), "arce".to_string(), "tre".to_string()],
            provider: "none".to_string(),
            model: None,
            api_key: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            sim_timeout: Duration::from_secs(30),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, CiteSightError> {
        let mut config = Self::default();

        for (engine, var) in [("ade", "WEIGHT_ADE"), ("arce", "WEIGHT_ARCE"), ("tre", "WEIGHT_TRE")]
        {
            if let Ok(raw) = env::var(var) {
                let weight = raw
                    .parse::<f64>()
                    .map_err(|_| CiteSightError::Config(format!("{var} must be a number")))?;
                config.weights.insert(engine.to_string(), weight);
            }
        }

        if let Ok(provider) = env::var("LLM_PROVIDER") {
            config.provider = provider.to_lowercase();
        }
        config.model = env::var("LLM_MODEL").ok();
        config.api_key = match config.provider.as_str() {
            "anthropic" => env::var("ANTHROPIC_API_KEY").ok(),
            "openai" => env::var("OPENAI_API_KEY").ok(),
            _ => None,
        };
        if let Ok(url) = env::var("OLLAMA_BASE_URL") {
            config.ollama_base_url = url;
        }
        if let Ok(raw) = env::var("SIM_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| CiteSightError::Config("SIM_TIMEOUT_SECS must be an integer".into()))?;
            config.sim_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on anything that would make scores meaningless. Never
    /// silently substitutes defaults for bad values.
    pub fn validate(&self) -> Result<(), CiteSightError> {
        if self.enabled_engines.is_empty() {
            return Err(CiteSightError::Config("no engines enabled".into()));
        }

        for (engine, weight) in &self.weights {
            if *weight < 0.0 || !weight.is_finite() {
                return Err(CiteSightError::Config(format!(
                    "engine '{engine}' has invalid weight {weight}; weights must be finite and non-negative"
                )));
            }
        }

        let sum: f64 = self.weights.values().sum();
        if sum > 1.0 + WEIGHT_SUM_EPSILON {
            return Err(CiteSightError::Config(format!(
                "engine weights sum to {sum:.4}; configured weights must sum to at most 1.0"
            )));
        }

        let enabled_sum: f64 = self
            .enabled_engines
            .iter()
            .filter_map(|id| self.weights.get(id))
            .sum();
        if enabled_sum <= 0.0 {
            return Err(CiteSightError::Config(
                "weights of enabled engines sum to zero and cannot be renormalized".into(),
            ));
        }

        if self.sim_timeout.is_zero() {
            return Err(CiteSightError::Config("simulation timeout must be non-zero".into()));
        }

        Ok(())
    }

    /// Nominal weight for an engine; engines missing from the table carry
    /// zero weight.
    pub fn weight_of(&self, engine: &str) -> f64 {
        self.weights.get(engine).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn default_weights_match_shipping_table() {
        let config = AnalysisConfig::default();
        assert_eq!(config.weight_of("ade"), 0.30);
        assert_eq!(config.weight_of("arce"), 0.20);
        assert_eq!(config.weight_of("tre"), 0.20);
        assert_eq!(config.weight_of("ere"), 0.0);
    }

    #[test]
    fn negative_weight_is_a_config_error() {
        let mut config = AnalysisConfig::default();
        config.weights.insert("ade".to_string(), -0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversubscribed_weights_are_a_config_error() {
        let mut config = AnalysisConfig::default();
        config.weights.insert("ade".to_string(), 0.9);
        // 0.9 + 0.2 + 0.2 > 1.0
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_zero_enabled_weights_are_a_config_error() {
        let mut config = AnalysisConfig::default();
        for w in config.weights.values_mut() {
            *w = 0.0;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_weight_on_a_disabled_engine_is_fine() {
        let mut config = AnalysisConfig::default();
        config.enabled_engines = vec!["ade".to_string(), "tre".to_string()];
        config.weights.insert("arce".to_string(), 0.0);
        config.validate().unwrap();
    }

    #[test]
    fn empty_engine_set_is_a_config_error() {
        let mut config = AnalysisConfig::default();
        config.enabled_engines.clear();
        assert!(config.validate().is_err());
    }
}
