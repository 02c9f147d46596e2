//! Structured LLM Client (C3).
//!
//! Provider selection is driven by [`agent_core::RunConfig::llm_provider`].
//! The exposed operation is `generate(schema, prompt)`: the returned object
//! is guaranteed to validate against the schema, or the call returns a
//! recoverable [`LlmError`]. No chat history is maintained between calls.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LlmError;

#[async_trait]
pub trait StructuredLlmClient: Send + Sync {
    /// Send `prompt` and request a JSON object matching `schema`. The
    /// implementation validates the decoded response before returning it.
    async fn generate(&self, schema: &Value, prompt: &str) -> Result<Value, LlmError>;

    /// Provider identifier, used in logging and error messages.
    fn provider_name(&self) -> &'static str;
}

/// Validate `value` against `schema`, mapping failures to a single
/// [`LlmError::SchemaInvalid`] carrying every validation error message.
pub fn validate_against_schema(
    provider: &'static str,
    schema: &Value,
    value: &Value,
) -> Result<(), LlmError> {
    let compiled = jsonschema::validator_for(schema).map_err(|e| LlmError::Decode {
        provider,
        reason: format!("invalid schema: {e}"),
    })?;

    let errors: Vec<String> = compiled.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LlmError::SchemaInvalid { provider, errors })
    }
}
