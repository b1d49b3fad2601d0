//! Retrieval-augmented answering over the employee roster.
//!
//! - `normalize`: query clean-up and synonym expansion
//! - `profile`: record -> text renderings (embedding unit and prompt lines)
//! - `index`: exact L2 nearest-neighbour search
//! - `retriever`: query -> ranked employees
//! - `synthesizer`: ranked employees -> answer text, with fallback
//! - `pipeline`: the two stages composed

pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod retriever;
pub mod synthesizer;


pub use index::{FlatL2Index, IndexError, Neighbor, SimilarityIndex};
pub use pipeline::{QueryAnswer, RagPipeline};
pub use retriever::{BuildError, RetrievedEmployee, Retriever, DEFAULT_TOP_K};
pub use synthesizer::{ResponseSynthesizer, Synthesis, NO_MATCH_RESPONSE};
