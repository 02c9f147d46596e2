pub mod anthropic;
pub mod client;
pub mod error;
pub mod openai;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{validate_against_schema, StructuredLlmClient};
pub use error::{make_snippet, LlmError};
pub use openai::{OpenAiClient, OpenAiConfig};

use std::sync::Arc;

use agent_core::LlmProvider;

/// Build the configured provider's client from a `RunConfig`-shaped tuple of
/// `(provider, api_key, model)`. Mirrors the teacher's `default_adapter_for`
/// provider-to-implementation switch.
pub fn default_client_for(
    provider: LlmProvider,
    api_key: String,
    model: String,
) -> Result<Arc<dyn StructuredLlmClient>, LlmError> {
    match provider {
        LlmProvider::OpenAi => {
            let client = OpenAiClient::new(OpenAiConfig::new(api_key, model))?;
            Ok(Arc::new(client))
        }
        LlmProvider::Anthropic => {
            let client = AnthropicClient::new(AnthropicConfig::new(api_key, model))?;
            Ok(Arc::new(client))
        }
    }
}
