pub mod anthropic;
pub mod citation;
pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod traits;

pub use anthropic::AnthropicSimulator;
pub use ollama::OllamaSimulator;
pub use openai::OpenAiSimulator;
pub use traits::{Provider, SimulationError, SimulationRequest, Simulator};

use std::sync::Arc;

use citesight_common::{AnalysisConfig, CiteSightError};

/// Build the configured simulation backend. `Ok(None)` means the `none`
/// provider was selected and the caller should skip simulation entirely;
/// an unknown provider or a cloud provider without a key fails fast.
pub fn build_simulator(
    config: &AnalysisConfig,
) -> Result<Option<Arc<dyn Simulator>>, CiteSightError> {
    let provider = Provider::parse(&config.provider)?;
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    match provider {
        Provider::None => Ok(None),
        Provider::Anthropic => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                CiteSightError::Config("anthropic provider requires an API key".into())
            })?;
            Ok(Some(Arc::new(AnthropicSimulator::new(api_key, model))))
        }
        Provider::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                CiteSightError::Config("openai provider requires an API key".into())
            })?;
            Ok(Some(Arc::new(OpenAiSimulator::new(api_key, model))))
        }
        Provider::Ollama => Ok(Some(Arc::new(OllamaSimulator::new(
            config.ollama_base_url.clone(),
            model,
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_provider_builds_no_simulator() {
        let config = AnalysisConfig::default();
        assert!(build_simulator(&config).unwrap().is_none());
    }

    #[test]
    fn unknown_provider_fails_fast() {
        let mut config = AnalysisConfig::default();
        config.provider = "bard".to_string();
        assert!(matches!(
            build_simulator(&config),
            Err(CiteSightError::UnknownProvider(_))
        ));
    }

    #[test]
    fn cloud_provider_without_a_key_fails_fast() {
        let mut config = AnalysisConfig::default();
        config.provider = "anthropic".to_string();
        assert!(matches!(
            build_simulator(&config),
            Err(CiteSightError::Config(_))
        ));
    }

    #[test]
    fn ollama_needs_no_key() {
        let mut config = AnalysisConfig::default();
        config.provider = "ollama".to_string();
        let simulator = build_simulator(&config).unwrap().unwrap();
        assert_eq!(simulator.provider(), "ollama");
    }
}
