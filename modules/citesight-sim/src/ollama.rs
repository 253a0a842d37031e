//! Locally hosted model via Ollama's generate endpoint. Small local
//! models do not reliably emit JSON, so the attribute pass is parsed out
//! of free text with the list extractor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use citesight_common::SimulationResult;

use crate::citation;
use crate::prompts;
use crate::traits::{SimulationError, SimulationRequest, Simulator};

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaSimulator {
    base_url: String,
    model: String,
    http: reqwest::Client,
}

impl OllamaSimulator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn generate(
        &self,
        prompt: String,
        system: Option<String>,
    ) -> Result<String, SimulationError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, "ollama generate request");

        let request = GenerateRequest { model: self.model.clone(), prompt, system, stream: false };
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SimulationError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SimulationError::Provider(format!(
                "ollama error ({status}): {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SimulationError::Parse(e.to_string()))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl Simulator for OllamaSimulator {
    fn provider(&self) -> &'static str {
        "ollama"
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let response = self
            .generate(
                prompts::recommendation_prompt(request),
                Some(prompts::RECOMMENDER_SYSTEM_PROMPT.to_string()),
            )
            .await?;
        let analysis = citation::analyze(&response, &request.brand);

        let missing_signals = match self.generate(prompts::attribute_prompt(request), None).await {
            Ok(text) => citation::extract_attributes(&text),
            Err(e) => {
                warn!(error = %e, "attribute pass failed, continuing without missing signals");
                Vec::new()
            }
        };

        Ok(SimulationResult {
            brand_cited: analysis.cited,
            citation_count: analysis.count,
            missing_signals,
            citation_contexts: analysis.contexts,
            sentiment: analysis.sentiment,
        })
    }
}
