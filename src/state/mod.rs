use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService, Settings};

pub mod error;
pub mod rag_service;

pub use error::InitializationError;
pub use rag_service::{RagBootstrap, RagService, RosterSource};

/// Application state shared across all routes.
///
/// Holds the resolved paths and configuration plus the single `RagService`
/// whose pipeline (roster, embedder, index, generator) is built once.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<Settings>,
    pub rag: RagService,
}

impl AppState {
    /// Loads configuration and prepares the RAG service.
    ///
    /// The pipeline itself is built lazily by `rag.pipeline()`; the binary
    /// forces it before serving so that a broken roster or embedding backend
    /// aborts startup.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let config_value = config
            .load_config()
            .map_err(|e| InitializationError::Config(e.into()))?;
        let settings = Settings::from_config(&config_value);

        let bootstrap = RagBootstrap::from_settings(&settings, &paths)?;
        let rag = RagService::new(bootstrap);

        Ok(Self::from_parts(paths, config, settings, rag))
    }

    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: Settings,
        rag: RagService,
    ) -> Arc<Self> {
        Arc::new(AppState {
            paths,
            config,
            settings: Arc::new(settings),
            rag,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn initialize_reads_config_and_builds_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(
            dir.path().join("data/employees.json"),
            r#"{"employees": [{"id": "E1", "name": "Alice", "skills": ["Python"],
                "experience_years": 4, "projects": ["P1"], "availability": "Available"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("config.yml"),
            "rag:\n  top_k: 2\nembedding:\n  provider: hashing\nllm:\n  provider: disabled\n",
        )
        .unwrap();

        let paths = Arc::new(AppPaths::from_dirs(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ));
        let state = AppState::initialize(paths).await.unwrap();
        assert_eq!(state.settings.rag.top_k, 2);

        let pipeline = state.rag.pipeline().await.unwrap();
        assert_eq!(pipeline.employee_count(), 1);
        assert_eq!(pipeline.top_k(), 2);
    }

    #[tokio::test]
    async fn invalid_config_fails_initialization() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "embedding:\n  provider: word2vec\n").unwrap();

        let paths = Arc::new(AppPaths::from_dirs(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ));
        let err = AppState::initialize(paths).await.err().unwrap();
        assert!(matches!(err, InitializationError::Config(_)));
    }
}
