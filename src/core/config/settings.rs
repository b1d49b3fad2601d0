//! Typed view over the merged YAML configuration.
//!
//! Every value has a default, so an empty `config.yml` yields a runnable service
//! (in-process MiniLM embedder + local Ollama for generation).

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::rag::DEFAULT_TOP_K;

pub const DEFAULT_ROSTER_PATH: &str = "data/employees.json";
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_LMSTUDIO_URL: &str = "http://localhost:1234";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    Local,
    Hashing,
    Ollama,
    LmStudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationBackend {
    Ollama,
    LmStudio,
    Disabled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagSettings {
    pub roster_path: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmSettings {
    pub backend: GenerationBackend,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub rag: RagSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Value::Null)
    }
}

impl Settings {
    pub fn from_config(config: &Value) -> Self {
        Self {
            rag: RagSettings::from_config(config.get("rag")),
            embedding: EmbeddingSettings::from_config(config.get("embedding")),
            llm: LlmSettings::from_config(config.get("llm")),
            server: ServerSettings::from_config(config.get("server")),
        }
    }
}

impl RagSettings {
    fn from_config(section: Option<&Value>) -> Self {
        let roster_path = string_field(section, "roster_path")
            .unwrap_or_else(|| DEFAULT_ROSTER_PATH.to_string());
        let top_k = section
            .and_then(|v| v.get("top_k"))
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_TOP_K as u64)
            .clamp(1, 50) as usize;

        Self { roster_path, top_k }
    }
}

impl EmbeddingSettings {
    fn from_config(section: Option<&Value>) -> Self {
        let backend = match string_field(section, "provider").as_deref() {
            Some("ollama") => EmbeddingBackend::Ollama,
            Some("lmstudio") => EmbeddingBackend::LmStudio,
            Some("hashing") => EmbeddingBackend::Hashing,
            _ => EmbeddingBackend::Local,
        };
        let default_url = match backend {
            EmbeddingBackend::LmStudio => DEFAULT_LMSTUDIO_URL,
            _ => DEFAULT_OLLAMA_URL,
        };
        let dimension = section
            .and_then(|v| v.get("dimension"))
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_EMBEDDING_DIMENSION as u64)
            .clamp(8, 4096) as usize;

        Self {
            backend,
            base_url: string_field(section, "base_url").unwrap_or_else(|| default_url.to_string()),
            model: string_field(section, "model").unwrap_or_else(|| "all-minilm".to_string()),
            dimension,
            timeout: timeout_field(section, 30),
        }
    }
}

impl LlmSettings {
    fn from_config(section: Option<&Value>) -> Self {
        let backend = match string_field(section, "provider").as_deref() {
            Some("lmstudio") => GenerationBackend::LmStudio,
            Some("disabled") => GenerationBackend::Disabled,
            _ => GenerationBackend::Ollama,
        };
        let default_url = match backend {
            GenerationBackend::LmStudio => DEFAULT_LMSTUDIO_URL,
            _ => DEFAULT_OLLAMA_URL,
        };

        Self {
            backend,
            base_url: string_field(section, "base_url").unwrap_or_else(|| default_url.to_string()),
            model: string_field(section, "model").unwrap_or_else(|| "mistral".to_string()),
            timeout: timeout_field(section, 30),
            api_key: string_field(section, "api_key"),
        }
    }
}

impl ServerSettings {
    fn from_config(section: Option<&Value>) -> Self {
        let port = section
            .and_then(|v| v.get("port"))
            .and_then(|v| v.as_u64())
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(8000);
        let cors_allowed_origins = section
            .and_then(|v| v.get("cors_allowed_origins"))
            .and_then(|v| v.as_array())
            .map(|list| {
                list.iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(default_local_origins);

        Self {
            host: string_field(section, "host").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            cors_allowed_origins,
        }
    }
}

fn string_field(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn timeout_field(section: Option<&Value>, default_secs: u64) -> Duration {
    let secs = section
        .and_then(|v| v.get("timeout_secs"))
        .and_then(|v| v.as_u64())
        .unwrap_or(default_secs)
        .clamp(1, 600);
    Duration::from_secs(secs)
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost:8501".to_string(),
        "http://127.0.0.1:8501".to_string(),
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
