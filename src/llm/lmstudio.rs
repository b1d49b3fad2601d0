use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use super::provider::{non_empty_text, LlmProvider};
use super::types::ChatMessage;

/// OpenAI-compatible server (LM Studio, llama.cpp server, vLLM, ...).
#[derive(Clone)]
pub struct LmStudioProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl LmStudioProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmProvider for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        match self.authorize(self.client.get(&url)).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": model_id,
            "messages": [ChatMessage::user(prompt)],
            "stream": false,
        });

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("LM Studio chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        non_empty_text(
            payload["choices"][0]["message"]["content"].as_str(),
            self.name(),
        )
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("LM Studio embed error: {}", text)));
        }

        let mut payload: EmbeddingsResponse = res.json().await.map_err(ApiError::internal)?;
        // Servers may return items out of order; `index` restores input order.
        payload.data.sort_by_key(|item| item.index.unwrap_or(usize::MAX));
        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}
