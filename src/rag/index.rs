//! Exact nearest-neighbour search over profile embeddings.
//!
//! Vector position is identity: row `i` of the index is the embedding of
//! roster entry `i`.

use ndarray::{Array2, ArrayView1};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("embedding at position {position} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("embeddings must not be empty")]
    EmptyVector,

    #[error("query has dimension {found}, index expects {expected}")]
    QueryDimension { expected: usize, found: usize },

    #[error("index holds {vectors} vectors but roster has {records} records")]
    PositionMismatch { vectors: usize, records: usize },

    #[error("failed to shape embedding matrix: {0}")]
    Shape(String),
}

/// One search hit: roster position and squared Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Read-only after construction; `search` takes `&self` and is safe to call
/// from many tasks at once.
pub trait SimilarityIndex: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` for an empty index.
    fn dimension(&self) -> Option<usize>;

    /// The `k` nearest vectors by ascending squared L2 distance, ties in
    /// insertion order. `k` larger than the index is clamped.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError>;
}

/// Brute-force scan over a dense `n x dim` matrix.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    vectors: Array2<f32>,
}

impl FlatL2Index {
    /// Bulk-loads every vector at once. All vectors must share one non-zero
    /// dimension.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let Some(first) = vectors.first() else {
            return Ok(Self {
                vectors: Array2::zeros((0, 0)),
            });
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(IndexError::EmptyVector);
        }

        let mut flat = Vec::with_capacity(vectors.len() * dimension);
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    position,
                    expected: dimension,
                    found: vector.len(),
                });
            }
            flat.extend_from_slice(vector);
        }

        let vectors = Array2::from_shape_vec((vectors.len(), dimension), flat)
            .map_err(|err| IndexError::Shape(err.to_string()))?;
        Ok(Self { vectors })
    }
}

impl SimilarityIndex for FlatL2Index {
    fn len(&self) -> usize {
        self.vectors.nrows()
    }

    fn dimension(&self) -> Option<usize> {
        if self.len() == 0 {
            None
        } else {
            Some(self.vectors.ncols())
        }
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let Some(dimension) = self.dimension() else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != dimension {
            return Err(IndexError::QueryDimension {
                expected: dimension,
                found: query.len(),
            });
        }

        let query = ArrayView1::from(query);
        let mut scored: Vec<Neighbor> = self
            .vectors
            .outer_iter()
            .enumerate()
            .map(|(position, row)| {
                let diff = &row - &query;
                Neighbor {
                    position,
                    distance: diff.dot(&diff),
                }
            })
            .collect();

        // sort_by is stable: equal distances keep insertion order.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatL2Index {
        FlatL2Index::build(&[
            vec![0.0, 0.0],
            vec![3.0, 4.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn returns_nearest_first_with_squared_distance() {
        let hits = index().search(&[0.9, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 2);
        assert!((hits[0].distance - 0.01).abs() < 1e-6);
        assert_eq!(hits[1].position, 0);
        assert!((hits[1].distance - 0.81).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_insertion_order() {
        // (1,0) and (0,1) are both at distance 1 from the origin.
        let hits = index().search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn k_is_clamped_to_index_size() {
        let hits = index().search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits.last().unwrap().position, 1);
        assert!((hits.last().unwrap().distance - 25.0).abs() < 1e-6);
    }

    #[test]
    fn results_are_non_decreasing_for_every_k() {
        let index = index();
        for k in 0..=6 {
            let hits = index.search(&[0.4, 0.7], k).unwrap();
            assert_eq!(hits.len(), k.min(index.len()));
            assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        }
    }

    #[test]
    fn empty_index_returns_nothing() {
        let empty = FlatL2Index::build(&[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.dimension(), None);
        assert!(empty.search(&[1.0, 2.0, 3.0], 3).unwrap().is_empty());
    }

    #[test]
    fn mixed_dimensions_fail_to_build() {
        let err = FlatL2Index::build(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                position: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(FlatL2Index::build(&[vec![]]).unwrap_err(), IndexError::EmptyVector);
    }

    #[test]
    fn query_dimension_is_checked() {
        let err = index().search(&[1.0, 2.0, 3.0], 1).unwrap_err();
        assert_eq!(err, IndexError::QueryDimension { expected: 2, found: 3 });
    }

    #[test]
    fn concurrent_searches_agree() {
        let index = std::sync::Arc::new(index());
        let expected = index.search(&[0.2, 0.9], 4).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = index.clone();
                std::thread::spawn(move || index.search(&[0.2, 0.9], 4).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
