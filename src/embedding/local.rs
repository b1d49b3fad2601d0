use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;

use crate::core::errors::ApiError;

use super::provider::EmbeddingProvider;

/// In-process sentence embedder (ONNX via `fastembed`).
///
/// The model is loaded on the first `embed` call and cached under `cache_dir`.
/// Inference is CPU-bound, so it runs on the blocking pool; `TextEmbedding`
/// needs `&mut self`, hence the mutex.
pub struct LocalEmbedder {
    model: EmbeddingModel,
    model_name: String,
    dimension: usize,
    cache_dir: PathBuf,
    engine: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalEmbedder {
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self, ApiError> {
        let (model, dimension) = resolve_model(model_name).ok_or_else(|| {
            ApiError::BadRequest(format!("unsupported local embedding model: {model_name}"))
        })?;
        Ok(Self {
            model,
            model_name: model_name.to_string(),
            dimension,
            cache_dir,
            engine: OnceCell::new(),
        })
    }

    async fn engine(&self) -> Result<Arc<Mutex<TextEmbedding>>, ApiError> {
        self.engine
            .get_or_try_init(|| async {
                let options = InitOptions::new(self.model.clone())
                    .with_cache_dir(self.cache_dir.clone())
                    .with_show_download_progress(false);
                let model_name = self.model_name.clone();

                let engine = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
                    .await
                    .map_err(ApiError::internal)?
                    .map_err(|e| {
                        ApiError::Internal(format!(
                            "failed to load embedding model {model_name}: {e}"
                        ))
                    })?;
                tracing::info!("Loaded local embedding model {}", self.model_name);
                Ok(Arc::new(Mutex::new(engine)))
            })
            .await
            .cloned()
    }
}

/// Accepted model names and their output width.
fn resolve_model(name: &str) -> Option<(EmbeddingModel, usize)> {
    let key = name.trim().to_lowercase();
    let key = key.strip_prefix("sentence-transformers/").unwrap_or(&key);
    match key {
        "all-minilm" | "all-minilm-l6-v2" => Some((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-minilm-l12-v2" => Some((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Some((EmbeddingModel::BGESmallENV15, 384)),
        _ => None,
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let engine = self.engine().await?;
        let batch = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = engine
                .lock()
                .map_err(|_| ApiError::internal("embedding model lock poisoned"))?;
            model.embed(batch, None).map_err(ApiError::internal)
        })
        .await
        .map_err(ApiError::internal)??;

        if vectors.len() != texts.len() {
            return Err(ApiError::Internal(format!(
                "local embedder returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minilm_aliases_resolve() {
        for name in [
            "all-minilm",
            "all-MiniLM-L6-v2",
            "sentence-transformers/all-MiniLM-L6-v2",
        ] {
            let (model, dim) = resolve_model(name).unwrap();
            assert_eq!(model, EmbeddingModel::AllMiniLML6V2, "name: {name}");
            assert_eq!(dim, 384);
        }
    }

    #[test]
    fn unknown_model_is_rejected_without_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalEmbedder::new("gpt-embed-huge", dir.path().to_path_buf())
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("gpt-embed-huge")));
    }

    #[test]
    fn dimension_is_known_before_first_call() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = LocalEmbedder::new("all-minilm", dir.path().to_path_buf()).unwrap();
        assert_eq!(EmbeddingProvider::dimension(&embedder), Some(384));
        assert_eq!(embedder.name(), "local");
    }

    #[tokio::test]
    async fn empty_batch_does_not_load_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = LocalEmbedder::new("all-minilm", dir.path().to_path_buf()).unwrap();
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
        assert!(embedder.engine.get().is_none());
    }

    // Downloads the model on first run.
    #[tokio::test]
    #[ignore]
    async fn aws_query_is_closest_to_aws_profile() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = LocalEmbedder::new("all-minilm", dir.path().to_path_buf()).unwrap();
        let texts = vec![
            "Skills: Java, Spring".to_string(),
            "Skills: AWS, Terraform".to_string(),
            "find developers who know amazon web services".to_string(),
        ];
        let vectors = embedder.embed(&texts).await.unwrap();
        let distance = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
        };
        assert_eq!(vectors[0].len(), 384);
        assert!(distance(&vectors[2], &vectors[1]) < distance(&vectors[2], &vectors[0]));
    }
}
