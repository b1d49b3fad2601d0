use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

use super::provider::EmbeddingProvider;

/// Embeds through an `LlmProvider` bound to a single model id.
///
/// The first successful batch pins the dimension; any later batch with a
/// different width is rejected instead of being compared against the index.
pub struct RemoteEmbedder {
    provider: Arc<dyn LlmProvider>,
    model_id: String,
    dimension: OnceLock<usize>,
}

impl RemoteEmbedder {
    pub fn new(provider: Arc<dyn LlmProvider>, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            dimension: OnceLock::new(),
        }
    }

    fn check_shape(&self, inputs: usize, vectors: &[Vec<f32>]) -> Result<(), ApiError> {
        if vectors.len() != inputs {
            return Err(ApiError::Internal(format!(
                "{} returned {} embeddings for {} inputs",
                self.provider.name(),
                vectors.len(),
                inputs
            )));
        }

        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let width = first.len();
        if width == 0 || vectors.iter().any(|v| v.len() != width) {
            return Err(ApiError::Internal(format!(
                "{} returned embeddings of inconsistent dimension",
                self.provider.name()
            )));
        }

        let pinned = *self.dimension.get_or_init(|| width);
        if pinned != width {
            return Err(ApiError::Internal(format!(
                "embedding dimension changed from {} to {} (model {})",
                pinned, width, self.model_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get().copied()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.provider.embed(texts, &self.model_id).await?;
        self.check_shape(texts.len(), &vectors)?;
        Ok(vectors)
    }
}
