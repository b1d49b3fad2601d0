use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("Failed to load employee roster: {0}")]
    Roster(#[source] anyhow::Error),

    #[error("Failed to initialize embedding provider: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Failed to initialize LLM provider: {0}")]
    Llm(#[source] anyhow::Error),

    #[error("Failed to build similarity index: {0}")]
    Index(#[source] anyhow::Error),
}
