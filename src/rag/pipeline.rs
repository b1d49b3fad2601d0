use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::roster::Employee;

use super::retriever::Retriever;
use super::synthesizer::ResponseSynthesizer;

/// Answer text plus the candidates it was grounded on. This is the payload of
/// `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub response: String,
    pub employees: Vec<Employee>,
}

/// Retrieval followed by synthesis. Immutable once built; share it behind an
/// `Arc`.
pub struct RagPipeline {
    retriever: Retriever,
    synthesizer: ResponseSynthesizer,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, synthesizer: ResponseSynthesizer, top_k: usize) -> Self {
        Self {
            retriever,
            synthesizer,
            top_k: top_k.max(1),
        }
    }

    pub fn employee_count(&self) -> usize {
        self.retriever.len()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Never fails: a retrieval error becomes the response text with no
    /// employees, and generation errors already degrade inside the synthesizer.
    pub async fn answer(&self, query: &str) -> QueryAnswer {
        let employees = match self.retriever.retrieve(query, self.top_k).await {
            Ok(employees) => employees,
            Err(err) => {
                tracing::error!("Error processing query: {}", err);
                return QueryAnswer {
                    response: err.to_string(),
                    employees: Vec::new(),
                };
            }
        };

        let synthesis = self.synthesizer.synthesize(query, &employees).await;
        QueryAnswer {
            response: synthesis.into_text(),
            employees,
        }
    }

    /// Retrieval only, no generation call.
    pub async fn search(&self, query: &str) -> Result<Vec<Employee>, ApiError> {
        self.retriever.retrieve(query, self.top_k).await
    }
}
