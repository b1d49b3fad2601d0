//! Process-wide RAG pipeline with a one-time initialization barrier.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::core::config::settings::{EmbeddingBackend, GenerationBackend};
use crate::core::config::{AppPaths, Settings};
use crate::embedding::{EmbeddingProvider, HashingEmbedder, LocalEmbedder, RemoteEmbedder};
use crate::llm::{DisabledProvider, LlmProvider, LmStudioProvider, OllamaProvider};
use crate::rag::{BuildError, RagPipeline, ResponseSynthesizer, Retriever};
use crate::roster::{load_roster, Employee};

use super::error::InitializationError;

/// Where the roster comes from at initialization.
#[derive(Debug, Clone)]
pub enum RosterSource {
    File(PathBuf),
    Records(Vec<Employee>),
}

/// Everything needed to build the pipeline once.
pub struct RagBootstrap {
    pub roster: RosterSource,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn LlmProvider>,
    pub model_id: String,
    pub settings: Settings,
}

impl RagBootstrap {
    pub fn from_settings(settings: &Settings, paths: &AppPaths) -> Result<Self, InitializationError> {
        let roster = RosterSource::File(paths.resolve(&settings.rag.roster_path));
        let embedder = build_embedder(settings, paths)?;
        let generator = build_generator(settings)?;

        Ok(Self {
            roster,
            embedder,
            generator,
            model_id: settings.llm.model.clone(),
            settings: settings.clone(),
        })
    }

    async fn build(&self) -> Result<Arc<RagPipeline>, InitializationError> {
        let employees = match &self.roster {
            RosterSource::File(path) => {
                load_roster(path).map_err(|e| InitializationError::Roster(e.into()))?
            }
            RosterSource::Records(records) => records.clone(),
        };

        let retriever = Retriever::build(employees, self.embedder.clone())
            .await
            .map_err(|err| match err {
                BuildError::Embedding(e) => InitializationError::Embedding(e.into()),
                BuildError::Index(e) => InitializationError::Index(e.into()),
            })?;

        let synthesizer = ResponseSynthesizer::new(
            self.generator.clone(),
            self.model_id.clone(),
            self.settings.llm.timeout,
        );

        tracing::info!(
            "RAG pipeline initialized with {} employees (embedding: {} dim {:?}, generation: {}/{})",
            retriever.len(),
            self.embedder.name(),
            self.embedder.dimension(),
            self.generator.name(),
            self.model_id
        );

        Ok(Arc::new(RagPipeline::new(
            retriever,
            synthesizer,
            self.settings.rag.top_k,
        )))
    }
}

fn build_embedder(
    settings: &Settings,
    paths: &AppPaths,
) -> Result<Arc<dyn EmbeddingProvider>, InitializationError> {
    let embedding = &settings.embedding;
    let embedder: Arc<dyn EmbeddingProvider> = match embedding.backend {
        EmbeddingBackend::Local => Arc::new(
            LocalEmbedder::new(&embedding.model, paths.user_data_dir.join("models"))
                .map_err(|e| InitializationError::Embedding(e.into()))?,
        ),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(embedding.dimension)),
        EmbeddingBackend::Ollama => {
            let provider = OllamaProvider::new(&embedding.base_url, embedding.timeout)
                .map_err(|e| InitializationError::Embedding(e.into()))?;
            Arc::new(RemoteEmbedder::new(Arc::new(provider), embedding.model.clone()))
        }
        EmbeddingBackend::LmStudio => {
            let provider = LmStudioProvider::new(
                &embedding.base_url,
                settings.llm.api_key.clone(),
                embedding.timeout,
            )
            .map_err(|e| InitializationError::Embedding(e.into()))?;
            Arc::new(RemoteEmbedder::new(Arc::new(provider), embedding.model.clone()))
        }
    };
    Ok(embedder)
}

fn build_generator(settings: &Settings) -> Result<Arc<dyn LlmProvider>, InitializationError> {
    let llm = &settings.llm;
    let generator: Arc<dyn LlmProvider> = match llm.backend {
        GenerationBackend::Ollama => Arc::new(
            OllamaProvider::new(&llm.base_url, llm.timeout)
                .map_err(|e| InitializationError::Llm(e.into()))?,
        ),
        GenerationBackend::LmStudio => Arc::new(
            LmStudioProvider::new(&llm.base_url, llm.api_key.clone(), llm.timeout)
                .map_err(|e| InitializationError::Llm(e.into()))?,
        ),
        GenerationBackend::Disabled => Arc::new(DisabledProvider),
    };
    Ok(generator)
}

/// Cheap to clone; all clones share one pipeline.
///
/// `pipeline()` builds on first use. Callers that arrive while the build is
/// running wait on the same cell and never observe a partial index. A failed
/// build leaves the cell empty.
#[derive(Clone)]
pub struct RagService {
    cell: Arc<OnceCell<Arc<RagPipeline>>>,
    bootstrap: Arc<RagBootstrap>,
}

impl RagService {
    pub fn new(bootstrap: RagBootstrap) -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            bootstrap: Arc::new(bootstrap),
        }
    }

    pub async fn pipeline(&self) -> Result<Arc<RagPipeline>, InitializationError> {
        self.cell
            .get_or_try_init(|| self.bootstrap.build())
            .await
            .cloned()
    }

    /// The generation backend, for reachability checks.
    pub fn generator(&self) -> Arc<dyn LlmProvider> {
        self.bootstrap.generator.clone()
    }

    /// Non-blocking peek, `None` until initialization has finished.
    pub fn get(&self) -> Option<Arc<RagPipeline>> {
        self.cell.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::errors::ApiError;

    /// Counts profile batches and stalls briefly so callers overlap.
    struct SlowCountingEmbedder {
        inner: HashingEmbedder,
        batches: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for SlowCountingEmbedder {
        fn name(&self) -> &str {
            "slow"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            if texts.len() > 1 {
                self.batches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.embed(texts).await
        }
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Name {id}"),
            skills: vec!["Python".to_string()],
            experience_years: 1.0,
            projects: vec![],
            availability: "Available".to_string(),
        }
    }

    fn bootstrap(roster: RosterSource, embedder: Arc<dyn EmbeddingProvider>) -> RagBootstrap {
        RagBootstrap {
            roster,
            embedder,
            generator: Arc::new(DisabledProvider),
            model_id: "mistral".to_string(),
            settings: Settings::default(),
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_initialization() {
        let embedder = Arc::new(SlowCountingEmbedder {
            inner: HashingEmbedder::new(32),
            batches: AtomicUsize::new(0),
        });
        let service = RagService::new(bootstrap(
            RosterSource::Records(vec![employee("E1"), employee("E2")]),
            embedder.clone(),
        ));
        assert!(!service.is_initialized());
        assert!(service.get().is_none());

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.pipeline().await.map(|p| p.employee_count()) })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 2);
        }

        assert_eq!(embedder.batches.load(Ordering::SeqCst), 1);
        assert!(service.is_initialized());
        assert!(service.get().is_some());
    }

    #[tokio::test]
    async fn missing_roster_file_is_a_roster_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = RagService::new(bootstrap(
            RosterSource::File(dir.path().join("nope.json")),
            Arc::new(HashingEmbedder::new(8)),
        ));

        let err = service.pipeline().await.err().unwrap();
        assert!(matches!(err, InitializationError::Roster(_)));
        assert!(!service.is_initialized());
    }

    #[tokio::test]
    async fn disabled_generation_still_answers() {
        let service = RagService::new(bootstrap(
            RosterSource::Records(vec![employee("E1")]),
            Arc::new(HashingEmbedder::new(32)),
        ));

        let answer = service.pipeline().await.unwrap().answer("python").await;
        assert_eq!(answer.response, "Fallback response: Found 1 candidates: Name E1");
    }

    #[test]
    fn default_settings_build_local_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_dirs(dir.path().to_path_buf(), dir.path().to_path_buf());
        let bootstrap = RagBootstrap::from_settings(&Settings::default(), &paths).unwrap();

        // Building the bootstrap must not load the model yet.
        assert_eq!(bootstrap.embedder.name(), "local");
        assert_eq!(bootstrap.embedder.dimension(), Some(384));
        assert_eq!(bootstrap.generator.name(), "ollama");
        assert_eq!(bootstrap.model_id, "mistral");
        assert!(matches!(
            bootstrap.roster,
            RosterSource::File(ref path) if path.ends_with("data/employees.json")
        ));
    }

    #[test]
    fn hashing_backend_uses_configured_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_dirs(dir.path().to_path_buf(), dir.path().to_path_buf());
        let settings = Settings::from_config(&serde_json::json!({
            "embedding": { "provider": "hashing", "dimension": 64 }
        }));
        let bootstrap = RagBootstrap::from_settings(&settings, &paths).unwrap();

        assert_eq!(bootstrap.embedder.name(), "hashing");
        assert_eq!(bootstrap.embedder.dimension(), Some(64));
    }

    #[test]
    fn unknown_local_model_fails_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::from_dirs(dir.path().to_path_buf(), dir.path().to_path_buf());
        let settings = Settings::from_config(&serde_json::json!({
            "embedding": { "provider": "local", "model": "word2vec" }
        }));

        let err = RagBootstrap::from_settings(&settings, &paths).err().unwrap();
        assert!(matches!(err, InitializationError::Embedding(_)));
    }
}
