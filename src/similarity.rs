//! Cosine similarity and pairwise similarity matrices.
//!
//! Exhaustive pairwise computation, no indexing: the engine handles
//! batches of tens to low hundreds of items, where the simple
//! definition is both correct and fast enough.

use std::collections::HashMap;

use crate::content::ContentItem;

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Degenerate inputs are non-fatal: a zero-norm vector or a dimension
/// mismatch yields 0.0 rather than an error.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}

/// Full pairwise similarity matrix for a batch of embedded items.
///
/// Symmetric by construction: each unordered pair is computed once and
/// mirrored. The diagonal is exactly 1.0 by the identity convention,
/// zero vectors included.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    ids: Vec<u64>,
    index: HashMap<u64, usize>,
    /// Row-major n*n values.
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build the matrix over the embedded items in `items`; items
    /// without an embedding are skipped.
    pub fn build(items: &[ContentItem]) -> Self {
        let embedded: Vec<(&ContentItem, &[f32])> = items
            .iter()
            .filter_map(|item| item.embedding.as_deref().map(|e| (item, e)))
            .collect();

        let n = embedded.len();
        let ids: Vec<u64> = embedded.iter().map(|(item, _)| item.id).collect();
        let index: HashMap<u64, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let sim = cosine(embedded[i].1, embedded[j].1);
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        Self { ids, index, values }
    }

    /// Similarity for a pair of item ids; `None` when either id is not
    /// part of the matrix.
    pub fn get(&self, a: u64, b: u64) -> Option<f32> {
        let i = *self.index.get(&a)?;
        let j = *self.index.get(&b)?;
        Some(self.values[i * self.ids.len() + j])
    }

    /// Item ids covered by this matrix, in row order.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// Number of items covered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!((cosine(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert!((cosine(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = vec![0.3, -0.7, 0.2];
        let b = vec![0.9, 0.1, -0.4];
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
    }

    #[test]
    fn test_cosine_zero_norm() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_matrix_diagonal_is_one_even_for_zero_vector() {
        let items = vec![
            ContentItem::new(1, "a").with_embedding(vec![0.0, 0.0]),
            ContentItem::new(2, "b").with_embedding(vec![1.0, 0.0]),
        ];

        let matrix = SimilarityMatrix::build(&items);
        assert_eq!(matrix.get(1, 1), Some(1.0));
        assert_eq!(matrix.get(2, 2), Some(1.0));
        // Off-diagonal with the zero vector uses the cosine fallback.
        assert_eq!(matrix.get(1, 2), Some(0.0));
    }

    #[test]
    fn test_matrix_symmetric() {
        let items = vec![
            ContentItem::new(1, "a").with_embedding(vec![1.0, 0.2, 0.0]),
            ContentItem::new(2, "b").with_embedding(vec![0.1, 0.9, 0.3]),
            ContentItem::new(3, "c").with_embedding(vec![0.5, 0.5, 0.5]),
        ];

        let matrix = SimilarityMatrix::build(&items);
        for &a in matrix.ids() {
            for &b in matrix.ids() {
                assert_eq!(matrix.get(a, b), matrix.get(b, a));
            }
        }
    }

    #[test]
    fn test_matrix_skips_unembedded_items() {
        let items = vec![
            ContentItem::new(1, "a").with_embedding(vec![1.0, 0.0]),
            ContentItem::new(2, "b"),
        ];

        let matrix = SimilarityMatrix::build(&items);
        assert_eq!(matrix.len(), 1);
        assert!(matrix.get(1, 2).is_none());
    }

    #[test]
    fn test_matrix_empty() {
        let matrix = SimilarityMatrix::build(&[]);
        assert!(matrix.is_empty());
    }
}
