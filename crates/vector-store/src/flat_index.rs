use crate::error::{Result, VectorStoreError};
use std::cmp::Ordering;

/// Exact nearest-neighbor index over a flat, row-major buffer.
///
/// Rows are append-only; the position of a vector is its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::ZeroDimension);
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Rebuild an index from a row-major buffer read back from disk.
    pub(crate) fn from_rows(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::ZeroDimension);
        }
        if data.len() % dimension != 0 {
            return Err(VectorStoreError::CorruptData(format!(
                "{} values do not form rows of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self { dimension, data })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn vector(&self, row_id: usize) -> Option<&[f32]> {
        let start = row_id.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }

    pub(crate) fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Append vectors in order. Either every vector is appended or none is.
    pub fn add<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<()> {
        for vector in vectors {
            self.check(vector.as_ref())?;
        }
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector.as_ref());
        }
        Ok(())
    }

    /// Up to `k` `(row_id, squared_l2)` pairs, nearest first.
    ///
    /// Equal distances are ordered by row id. An empty index yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(VectorStoreError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        self.check(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .rows()
            .enumerate()
            .map(|(row_id, row)| (row_id, l2_distance_squared(query, row)))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, nearest_first);
            scored.truncate(k);
        }
        scored.sort_unstable_by(nearest_first);

        Ok(scored)
    }

    fn check(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        ensure_finite(vector)
    }
}

pub(crate) fn ensure_finite(vector: &[f32]) -> Result<()> {
    match vector.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(VectorStoreError::NonFiniteVector { position }),
        None => Ok(()),
    }
}

#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

// Row ids are unique, so this is a total order and unstable sorts stay deterministic.
fn nearest_first(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_add_and_search() {
        let mut index = VectorIndex::new(3).unwrap();
        index
            .add(&[[1.0, 0.0, 0.0], [0.9, 0.1, 0.0], [0.0, 1.0, 0.0]])
            .unwrap();
        assert_eq!(index.len(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], (0, 0.0));
        assert_eq!(results[1].0, 1);
        assert!((results[1].1 - 0.02).abs() < 1e-6);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            VectorIndex::new(0),
            Err(VectorStoreError::ZeroDimension)
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = VectorIndex::new(3).unwrap();
        let err = index.add(&[vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        index.add(&[[1.0, 0.0, 0.0]]).unwrap();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(VectorStoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn failed_add_appends_nothing() {
        let mut index = VectorIndex::new(2).unwrap();
        index.add(&[vec![1.0, 1.0]]).unwrap();

        let batch = vec![vec![0.0, 0.0], vec![2.0, 2.0], vec![3.0]];
        assert!(index.add(&batch).is_err());
        assert_eq!(index.len(), 1);

        let with_nan = vec![vec![0.0, 0.0], vec![f32::NAN, 0.0]];
        assert!(matches!(
            index.add(&with_nan),
            Err(VectorStoreError::NonFiniteVector { position: 0 })
        ));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::new(4).unwrap();
        assert!(index.search(&[0.0; 4], 10).unwrap().is_empty());
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = VectorIndex::new(2).unwrap();
        assert!(matches!(
            index.search(&[0.0, 0.0], 0),
            Err(VectorStoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn k_larger_than_len_returns_everything() {
        let mut index = VectorIndex::new(1).unwrap();
        index.add(&[[3.0], [1.0], [2.0]]).unwrap();
        let results = index.search(&[0.0], 50).unwrap();
        assert_eq!(results, vec![(1, 1.0), (2, 4.0), (0, 9.0)]);
    }

    #[test]
    fn ties_prefer_lower_row_id() {
        let mut index = VectorIndex::new(3).unwrap();
        index
            .add(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
            .unwrap();
        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(results, vec![(0, 0.0), (1, 2.0), (2, 2.0)]);

        // Same tie-break when the selection path cuts the list.
        let results = index.search(&[0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn vector_lookup_by_row() {
        let mut index = VectorIndex::new(2).unwrap();
        index.add(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(index.vector(1), Some(&[3.0, 4.0][..]));
        assert_eq!(index.vector(2), None);
        assert_eq!(index.vector(usize::MAX / 2), None);
        assert_eq!(index.vector(usize::MAX), None);
        assert_eq!(index.rows().count(), 2);
    }

    proptest! {
        #[test]
        fn proptest_search_matches_full_sort(
            rows in prop::collection::vec(prop::collection::vec(-4i8..4, 3), 0..40),
            query in prop::collection::vec(-4i8..4, 3),
            k in 1usize..50,
        ) {
            let rows: Vec<Vec<f32>> = rows
                .into_iter()
                .map(|row| row.into_iter().map(f32::from).collect())
                .collect();
            let query: Vec<f32> = query.into_iter().map(f32::from).collect();

            let mut index = VectorIndex::new(3).unwrap();
            index.add(&rows).unwrap();
            let results = index.search(&query, k).unwrap();

            let mut expected: Vec<(usize, f32)> = rows
                .iter()
                .enumerate()
                .map(|(id, row)| (id, l2_distance_squared(&query, row)))
                .collect();
            expected.sort_by(|a, b| a.1.total_cmp(&b.1));
            expected.truncate(k);

            prop_assert_eq!(results.len(), rows.len().min(k));
            prop_assert_eq!(results, expected);
        }
    }
}
