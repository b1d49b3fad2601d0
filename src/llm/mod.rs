pub mod lmstudio;
pub mod ollama;
pub mod provider;
pub mod types;


pub use lmstudio::LmStudioProvider;
pub use ollama::OllamaProvider;
pub use provider::{DisabledProvider, LlmProvider};
pub use types::ChatMessage;
