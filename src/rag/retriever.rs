use std::sync::Arc;

use thiserror::Error;

use crate::core::errors::ApiError;
use crate::embedding::EmbeddingProvider;
use crate::roster::Employee;

use super::index::{FlatL2Index, IndexError, SimilarityIndex};
use super::normalize::preprocess_query;
use super::profile::compose_profiles;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to embed employee profiles: {0}")]
    Embedding(#[source] ApiError),

    #[error("Failed to build similarity index: {0}")]
    Index(#[from] IndexError),
}

/// An employee returned by retrieval with its squared L2 distance to the query.
#[derive(Debug, Clone)]
pub struct RetrievedEmployee {
    pub employee: Employee,
    pub distance: f32,
}

/// Maps a free-text query to the closest roster entries.
pub struct Retriever {
    employees: Vec<Employee>,
    index: Arc<dyn SimilarityIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Wires a prebuilt index to its roster. Row `i` of `index` must be the
    /// embedding of `employees[i]`.
    pub fn new(
        employees: Vec<Employee>,
        index: Arc<dyn SimilarityIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexError> {
        if index.len() != employees.len() {
            return Err(IndexError::PositionMismatch {
                vectors: index.len(),
                records: employees.len(),
            });
        }
        Ok(Self {
            employees,
            index,
            embedder,
        })
    }

    /// Composes every profile, embeds them in one batch and bulk-loads a
    /// `FlatL2Index`.
    pub async fn build(
        employees: Vec<Employee>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, BuildError> {
        let profiles = compose_profiles(&employees);
        let vectors = embedder
            .embed(&profiles)
            .await
            .map_err(BuildError::Embedding)?;
        let index = FlatL2Index::build(&vectors)?;

        tracing::info!(
            "Built similarity index: {} vectors, dimension {:?} ({})",
            index.len(),
            index.dimension(),
            embedder.name()
        );

        Ok(Self::new(employees, Arc::new(index), embedder)?)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Best match first. An empty roster or a query that normalizes to
    /// nothing yields an empty list.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Employee>, ApiError> {
        Ok(self
            .retrieve_scored(query, k)
            .await?
            .into_iter()
            .map(|hit| hit.employee)
            .collect())
    }

    pub async fn retrieve_scored(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedEmployee>, ApiError> {
        let processed = preprocess_query(query);
        if self.index.is_empty() || processed.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_one(&processed).await?;
        let neighbors = self
            .index
            .search(&query_vector, k)
            .map_err(ApiError::internal)?;

        neighbors
            .into_iter()
            .map(|neighbor| {
                self.employees
                    .get(neighbor.position)
                    .cloned()
                    .map(|employee| RetrievedEmployee {
                        employee,
                        distance: neighbor.distance,
                    })
                    .ok_or_else(|| {
                        ApiError::Internal(format!(
                            "index returned position {} outside the roster",
                            neighbor.position
                        ))
                    })
            })
            .collect()
    }
}
