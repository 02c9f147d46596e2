//! OpenAI structured-output client.
//!
//! Minimal, non-streaming client around the chat completions endpoint in
//! JSON mode. Endpoint, model and reasoning effort are derived from the
//! supplied [`OpenAiConfig`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::client::{validate_against_schema, StructuredLlmClient};
use crate::error::{make_snippet, LlmError};

const PROVIDER: &str = "openai";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Applies the provider's high-effort reasoning flag when supported (§4.3).
    pub high_effort: bool,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 300,
            high_effort: false,
        }
    }
}

#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    cfg: OpenAiConfig,
    url_chat: String,
}

impl OpenAiClient {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, LlmError> {
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
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key)).map_err(|_| {
                LlmError::InvalidEndpoint {
                    provider: PROVIDER,
                    endpoint: cfg.endpoint.clone(),
                }
            })?,
        );
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
        let url_chat = format!("{base}/v1/chat/completions");

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "OpenAiClient initialized");

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }
}

#[async_trait]
impl StructuredLlmClient for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, schema: &Value, prompt: &str) -> Result<Value, LlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.cfg.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            reasoning_effort: if self.cfg.high_effort { Some("high") } else { None },
        };

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|source| LlmError::HttpTransport {
                provider: PROVIDER,
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(%status, %url, %snippet, latency_ms = started.elapsed().as_millis(), "openai chat completion failed");
            return Err(LlmError::HttpStatus {
                provider: PROVIDER,
                status,
                url,
                snippet,
            });
        }

        let decoded: ChatCompletionResponse = resp.json().await.map_err(|e| LlmError::Decode {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;

        let content = decoded
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(LlmError::EmptyChoices { provider: PROVIDER })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| LlmError::Decode {
            provider: PROVIDER,
            reason: format!("model output was not valid JSON: {e}"),
        })?;

        validate_against_schema(PROVIDER, schema, &value)?;

        info!(latency_ms = started.elapsed().as_millis(), "openai chat completion validated");
        Ok(value)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_api_key() {
        let cfg = OpenAiConfig::new("", "gpt-4o");
        let err = OpenAiClient::new(cfg).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { .. }));
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let mut cfg = OpenAiConfig::new("sk-xxx", "gpt-4o");
        cfg.endpoint = "api.openai.com".to_string();
        let err = OpenAiClient::new(cfg).unwrap_err();
        assert!(matches!(err, LlmError::InvalidEndpoint { .. }));
    }

    #[test]
    fn constructs_with_valid_config() {
        let cfg = OpenAiConfig::new("sk-xxx", "gpt-4o");
        let client = OpenAiClient::new(cfg).expect("valid client");
        assert_eq!(client.provider_name(), "openai");
        assert!(client.url_chat.ends_with("/v1/chat/completions"));
    }
}
