//! Anthropic structured-output client.
//!
//! Uses the Messages API with a single forced tool call shaped by the
//! caller's schema, so the model's response is a tool-call payload rather
//! than free text that has to be fished out of prose.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::{validate_against_schema, StructuredLlmClient};
use crate::error::{make_snippet, LlmError};

const PROVIDER: &str = "anthropic";
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const TOOL_NAME: &str = "emit_structured_output";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    /// Applies the provider's high-effort reasoning ("extended thinking") flag.
    pub high_effort: bool,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 300,
            max_tokens: 4096,
            high_effort: false,
        }
    }
}

#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    cfg: AnthropicConfig,
    url_messages: String,
}

impl AnthropicClient {
    pub fn new(cfg: AnthropicConfig) -> Result<Self, LlmError> {
        if cfg.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey { provider: PROVIDER });
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(LlmError::InvalidEndpoint {
                provider: PROVIDER,
                endpoint: cfg.endpoint.clone(),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&cfg.api_key).map_err(|_| LlmError::InvalidEndpoint {
                provider: PROVIDER,
                endpoint: cfg.endpoint.clone(),
            })?,
        );
        headers.insert("anthropic-version", header::HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|source| LlmError::HttpTransport {
                provider: PROVIDER,
                source,
            })?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_messages = format!("{base}/v1/messages");

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "AnthropicClient initialized");

        Ok(Self {
            client,
            cfg,
            url_messages,
        })
    }
}

#[async_trait]
impl StructuredLlmClient for AnthropicClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, schema: &Value, prompt: &str) -> Result<Value, LlmError> {
        let started = Instant::now();
        let body = MessagesRequest {
            model: &self.cfg.model,
            max_tokens: self.cfg.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            tools: vec![ToolDefinition {
                name: TOOL_NAME,
                input_schema: schema.clone(),
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: TOOL_NAME,
            },
        };

        debug!(model = %self.cfg.model, prompt_len = prompt.len(), "POST {}", self.url_messages);

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::HttpTransport {
                provider: PROVIDER,
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_messages.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, latency_ms = started.elapsed().as_millis(), "anthropic messages call failed");
            return Err(LlmError::HttpStatus {
                provider: PROVIDER,
                status,
                url,
                snippet,
            });
        }

        let decoded: MessagesResponse = resp.json().await.map_err(|e| LlmError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        let value = decoded
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input, .. } => Some(input),
                ContentBlock::Other => None,
            })
            .ok_or(LlmError::EmptyChoices { provider: PROVIDER })?;

        validate_against_schema(PROVIDER, schema, &value)?;

        info!(latency_ms = started.elapsed().as_millis(), "anthropic tool call validated");
        Ok(value)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
    tools: Vec<ToolDefinition>,
    tool_choice: ToolChoice,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: &'static str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "tool_use")]
    ToolUse { input: Value, #[allow(dead_code)] name: String },
    #[serde(other)]
    Other,
}
