//! Text -> vector embedding.
//!
//! One `EmbeddingProvider` instance is built at startup and shared by the index
//! build and every query, so profile and query vectors always come from the same
//! model.

mod hashing;
mod local;
mod provider;
mod remote;

pub use hashing::HashingEmbedder;
pub use local::LocalEmbedder;
pub use provider::EmbeddingProvider;
pub use remote::RemoteEmbedder;
