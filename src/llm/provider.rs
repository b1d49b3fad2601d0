use async_trait::async_trait;

use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "ollama", "lmstudio")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// single-prompt completion (non-streaming)
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ApiError>;

    /// generate embeddings, one vector per input in input order
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}

/// Provider used when `llm.provider: disabled`. Every call fails, so answers
/// always take the templated fallback.
#[derive(Debug, Clone, Default)]
pub struct DisabledProvider;

#[async_trait]
impl LlmProvider for DisabledProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn generate(&self, _prompt: &str, _model_id: &str) -> Result<String, ApiError> {
        Err(ApiError::ServiceUnavailable)
    }

    async fn embed(&self, _inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Err(ApiError::ServiceUnavailable)
    }
}

/// Rejects generated text that is empty or whitespace-only.
pub(crate) fn non_empty_text(text: Option<&str>, provider: &str) -> Result<String, ApiError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(ApiError::Internal(format!("{provider} returned an empty response"))),
        None => Err(ApiError::Internal(format!(
            "{provider} response is missing the generated text"
        ))),
    }
}
