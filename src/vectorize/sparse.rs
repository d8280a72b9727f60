// Sparse feature vectors and row matrices.
//
// TF-IDF rows are overwhelmingly zero (a plot summary touches a few dozen of
// 5000 vocabulary terms), so rows store only their non-zero entries with
// strictly ascending indices. Centroids are dense; the distance helpers here
// bridge the two without densifying rows.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{ClusterError, Result};

/// A sparse row: parallel index/value arrays, indices strictly ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from (index, value) pairs in any order. Duplicate indices are
    /// summed and explicit zeros dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        if let Some(&(bad, _)) = entries.iter().find(|(i, _)| *i >= dim) {
            return Err(ClusterError::DimensionMismatch {
                expected: dim,
                actual: bad + 1,
            });
        }
        entries.sort_by_key(|(i, _)| *i);

        let mut indices: Vec<usize> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        for (i, v) in entries {
            if indices.last() == Some(&i) {
                if let Some(last) = values.last_mut() {
                    *last += v;
                }
            } else {
                indices.push(i);
                values.push(v);
            }
        }

        let (indices, values) = indices
            .into_iter()
            .zip(values)
            .filter(|(_, v)| *v != 0.0)
            .unzip();

        Ok(Self {
            dim,
            indices,
            values,
        })
    }

    /// Build from a dense slice, keeping the non-zero entries.
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .unzip();
        Self {
            dim: dense.len(),
            indices,
            values,
        }
    }

    /// Dimensionality of the feature space this row lives in.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate (index, value) pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index` (zero when not stored).
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// Dot product with a dense vector of the same dimensionality.
    pub fn dot_dense(&self, dense: ArrayView1<f64>) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    /// Squared Euclidean distance to a dense point, given that point's
    /// precomputed squared norm: ‖x‖² − 2x·c + ‖c‖², clamped at zero.
    pub fn squared_distance_to(&self, dense: ArrayView1<f64>, dense_sq_norm: f64) -> f64 {
        (self.squared_norm() - 2.0 * self.dot_dense(dense) + dense_sq_norm).max(0.0)
    }

    /// Scale every value in place.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.values {
            *v *= factor;
        }
    }

    /// Divide by the L2 norm. An all-zero row stays all-zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.squared_norm().sqrt();
        if norm > 0.0 {
            self.scale(1.0 / norm);
        }
    }

    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.dim);
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}

/// Rows of sparse vectors sharing one dimensionality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    /// Assemble a matrix; every row must have `n_features` dimensions.
    pub fn from_rows(n_features: usize, rows: Vec<SparseVector>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.dim() != n_features) {
            return Err(ClusterError::DimensionMismatch {
                expected: n_features,
                actual: bad.dim(),
            });
        }
        Ok(Self { n_features, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SparseVector> {
        self.rows.iter()
    }

    /// Dense copy (n_rows × n_features). Only for small matrices and tests.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows.len(), self.n_features));
        for (r, row) in self.rows.iter().enumerate() {
            for (c, v) in row.iter() {
                dense[[r, c]] = v;
            }
        }
        dense
    }
}
