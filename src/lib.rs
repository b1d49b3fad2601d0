pub mod core;
pub mod embedding;
pub mod llm;
pub mod rag;
pub mod roster;
pub mod server;
pub mod state;
