//! Anthropic Messages API backend. The recommendation pass is a plain
//! text completion; the attribute pass forces a tool call so the missing
//! signals come back structured instead of scraped out of prose.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use citesight_common::SimulationResult;

use crate::citation;
use crate::prompts;
use crate::traits::{MissingSignals, SimulationError, SimulationRequest, Simulator};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ToolDefinition {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { input: serde_json::Value },
    #[serde(other)]
    Other,
}

impl ChatResponse {
    fn text(&self) -> Option<String> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            _ => None,
        })
    }

    fn tool_input(&self) -> Option<&serde_json::Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolUse { input } => Some(input),
            _ => None,
        })
    }
}

pub struct AnthropicSimulator {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl AnthropicSimulator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn headers(&self) -> Result<HeaderMap, SimulationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| SimulationError::Provider(e.to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, SimulationError> {
        let url = format!("{}/messages", self.base_url);
        debug!(model = %request.model, "anthropic chat request");

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
                "anthropic API error ({status}): {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SimulationError::Parse(e.to_string()))
    }

    async fn complete(&self, user_prompt: String) -> Result<String, SimulationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![WireMessage { role: "user", content: user_prompt }],
            system: Some(prompts::RECOMMENDER_SYSTEM_PROMPT.to_string()),
            temperature: Some(0.0),
            tools: None,
            tool_choice: None,
        };
        self.chat(&request)
            .await?
            .text()
            .ok_or_else(|| SimulationError::Parse("no text in anthropic response".into()))
    }

    async fn missing_signals(
        &self,
        request: &SimulationRequest,
    ) -> Result<Vec<String>, SimulationError> {
        let tool_name = "missing_signals";
        let schema = serde_json::to_value(schemars::schema_for!(MissingSignals))
            .map_err(|e| SimulationError::Parse(e.to_string()))?;

        let chat_request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![WireMessage {
                role: "user",
                content: prompts::attribute_prompt(request),
            }],
            system: None,
            temperature: Some(0.0),
            tools: Some(vec![ToolDefinition {
                name: tool_name.to_string(),
                description: "Report the attributes needed before recommending the brand."
                    .to_string(),
                input_schema: schema,
            }]),
            tool_choice: Some(serde_json::json!({ "type": "tool", "name": tool_name })),
        };

        let response = self.chat(&chat_request).await?;
        let input = response
            .tool_input()
            .ok_or_else(|| SimulationError::Parse("no tool output in anthropic response".into()))?;
        let parsed: MissingSignals = serde_json::from_value(input.clone())
            .map_err(|e| SimulationError::Parse(e.to_string()))?;
        Ok(parsed.signals)
    }
}

#[async_trait]
impl Simulator for AnthropicSimulator {
    fn provider(&self) -> &'static str {
        "anthropic"
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let response = self.complete(prompts::recommendation_prompt(request)).await?;
        let analysis = citation::analyze(&response, &request.brand);

        // The attribute pass enriches the verdict; its failure does not
        // discard an otherwise usable recommendation response.
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
