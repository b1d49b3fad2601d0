use async_trait::async_trait;

use crate::core::errors::ApiError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// backend name for logs
    fn name(&self) -> &str;

    /// Vector width, once known. Remote backends only learn it from their
    /// first batch.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Embeds a batch. Returns exactly one vector per input, in input order,
    /// all of one dimension.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::internal("embedding backend returned no vector"))
    }
}
