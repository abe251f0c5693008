use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Chunk;

#[derive(Debug, Error, PartialEq)]
pub enum VectorIndexError {
    #[error("vector dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index dimension must be greater than zero")]
    ZeroDimension,
}

/// One stored chunk together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A retrieval hit: the chunk and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Chunks with their embeddings, searchable by cosine similarity.
///
/// Entries keep the order in which they were built; that order breaks ties
/// between equal scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    embedding_model: String,
    dimension: usize,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(
        embedding_model: String,
        dimension: usize,
        entries: Vec<IndexEntry>,
    ) -> Result<Self, VectorIndexError> {
        let index = Self {
            embedding_model,
            dimension,
            built_at: Utc::now(),
            entries,
        };
        index.validate()?;
        Ok(index)
    }

    /// Checks that every stored vector has the index dimension.
    pub fn validate(&self) -> Result<(), VectorIndexError> {
        if self.dimension == 0 {
            return Err(VectorIndexError::ZeroDimension);
        }

        match self
            .entries
            .iter()
            .find(|entry| entry.vector.len() != self.dimension)
        {
            Some(entry) => Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: entry.vector.len(),
            }),
            None => Ok(()),
        }
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the `k` entries most similar to `query`, best first.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(&entry.vector, query)))
            .collect();

        // Stable sort: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredChunk {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect())
    }
}

/// Cosine similarity of two equally sized vectors; 0.0 when either is zero.
/// Never returns `-0.0`, so scores that are equal also sort as equal.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // `+ 0.0` folds -0.0 into 0.0.
    dot_product / (norm_a * norm_b) + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PageNumber;
    use proptest::prelude::*;

    fn entry(page: u32, text: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            chunk: Chunk::new(
                "manual.pdf".to_string(),
                PageNumber::new(page),
                text.to_string(),
                0,
                page as usize,
            ),
            vector,
        }
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::new(
            "test-embedding".to_string(),
            3,
            vec![
                entry(0, "motor", vec![1.0, 0.0, 0.0]),
                entry(1, "belt", vec![0.0, 1.0, 0.0]),
                entry(2, "motor and belt", vec![0.7, 0.7, 0.0]),
                entry(3, "safety", vec![0.0, 0.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_new_rejects_mismatched_vectors() {
        let result = VectorIndex::new(
            "m".to_string(),
            3,
            vec![entry(0, "a", vec![1.0, 0.0, 0.0]), entry(1, "b", vec![1.0])],
        );
        assert_eq!(
            result.unwrap_err(),
            VectorIndexError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        );
        assert_eq!(
            VectorIndex::new("m".to_string(), 0, vec![]).unwrap_err(),
            VectorIndexError::ZeroDimension
        );
    }

    #[test]
    fn test_retrieve_orders_by_similarity() {
        let index = sample_index();
        let results = index.retrieve(&[1.0, 0.1, 0.0], 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.text(), "motor");
        assert_eq!(results[1].chunk.text(), "motor and belt");
        assert_eq!(results[2].chunk.text(), "belt");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_retrieve_breaks_ties_by_insertion_order() {
        let index = VectorIndex::new(
            "m".to_string(),
            2,
            vec![
                entry(4, "first", vec![1.0, 0.0]),
                entry(1, "second", vec![2.0, 0.0]),
                entry(7, "third", vec![3.0, 0.0]),
            ],
        )
        .unwrap();

        let results = index.retrieve(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_zero_scores_of_either_sign_tie_by_insertion_order() {
        let index = VectorIndex::new(
            "m".to_string(),
            2,
            vec![
                entry(0, "first", vec![-1.0, 0.0]),
                entry(1, "second", vec![1.0, 0.0]),
            ],
        )
        .unwrap();

        let results = index.retrieve(&[0.0, -1.0], 2).unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(results[0].score.to_bits(), results[1].score.to_bits());
        assert_eq!(cosine_similarity(&[-1.0, 0.0], &[0.0, -1.0]).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn test_retrieve_bounds() {
        let index = sample_index();
        assert!(index.retrieve(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
        assert_eq!(index.retrieve(&[1.0, 0.0, 0.0], 50).unwrap().len(), 4);
    }

    #[test]
    fn test_retrieve_rejects_wrong_dimension() {
        let index = sample_index();
        assert_eq!(
            index.retrieve(&[1.0, 0.0], 3).unwrap_err(),
            VectorIndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn retrieval_is_deterministic_and_bounded(
            vectors in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 4), 1..30),
            query in proptest::collection::vec(-1.0f32..1.0, 4),
            k in 0usize..10,
        ) {
            let entries = vectors
                .into_iter()
                .enumerate()
                .map(|(i, v)| entry(i as u32, &format!("chunk {i}"), v))
                .collect();
            let index = VectorIndex::new("m".to_string(), 4, entries).unwrap();

            let first = index.retrieve(&query, k).unwrap();
            let second = index.retrieve(&query, k).unwrap();

            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() <= k);
            for window in first.windows(2) {
                prop_assert!(window[0].score >= window[1].score);
            }
        }
    }
}
