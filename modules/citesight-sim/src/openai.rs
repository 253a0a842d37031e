//! OpenAI Chat Completions backend. The attribute pass uses a JSON-object
//! response so the missing signals come back as a parseable list.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use citesight_common::SimulationResult;

use crate::citation;
use crate::prompts;
use crate::traits::{MissingSignals, SimulationError, SimulationRequest, Simulator};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

pub struct OpenAiSimulator {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiSimulator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap, SimulationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| SimulationError::Provider(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, SimulationError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, "openai chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| SimulationError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SimulationError::Provider(format!(
                "openai API error ({status}): {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SimulationError::Parse(e.to_string()))?;
        parsed
            .text()
            .ok_or_else(|| SimulationError::Parse("no content in openai response".into()))
    }

    async fn missing_signals(
        &self,
        request: &SimulationRequest,
    ) -> Result<Vec<String>, SimulationError> {
        let prompt = format!(
            "{}\n\nRespond as a JSON object: {{\"signals\": [\"...\"]}}",
            prompts::attribute_prompt(request)
        );
        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![WireMessage { role: "user", content: prompt }],
            temperature: Some(0.0),
            response_format: Some(serde_json::json!({ "type": "json_object" })),
        };
        let body = self.chat(&chat_request).await?;
        let parsed: MissingSignals =
            serde_json::from_str(&body).map_err(|e| SimulationError::Parse(e.to_string()))?;
        Ok(parsed.signals)
    }
}

#[async_trait]
impl Simulator for OpenAiSimulator {
    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system",
                    content: prompts::RECOMMENDER_SYSTEM_PROMPT.to_string(),
                },
                WireMessage {
                    role: "user",
                    content: prompts::recommendation_prompt(request),
                },
            ],
            temperature: Some(0.0),
            response_format: None,
        };
        let response = self.chat(&chat_request).await?;
        let analysis = citation::analyze(&response, &request.brand);

        let missing_signals = match self.missing_signals(request).await {
            Ok(signals) => signals,
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
