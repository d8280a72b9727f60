// Principal component analysis by power iteration on sparse rows.
//
// The covariance product is computed on the fly:
//
//   C·v ∝ Σ xᵢ (xᵢ·v) − n μ (μ·v)
//
// so neither the centered data nor the d × d covariance is ever
// materialized. Each axis is found by power iteration, re-orthogonalized
// against the axes already found (Gram–Schmidt deflation).

use ndarray::Array1;
use tracing::debug;

use crate::error::Result;
use crate::vectorize::sparse::FeatureMatrix;

const COMPONENTS: usize = 2;

/// Two-component PCA.
#[derive(Debug, Clone)]
pub struct Pca {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for Pca {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
        }
    }
}

impl Pca {
    /// Project every row onto the top two principal axes.
    ///
    /// Fewer than two rows have no variance to speak of; they all land on
    /// the origin.
    pub fn fit_transform(&self, matrix: &FeatureMatrix) -> Result<Vec<[f64; 2]>> {
        let n = matrix.n_rows();
        let d = matrix.n_features();
        if n < 2 || d == 0 {
            return Ok(vec![[0.0, 0.0]; n]);
        }

        let mut mean = Array1::<f64>::zeros(d);
        for row in matrix.iter() {
            for (j, v) in row.iter() {
                mean[j] += v;
            }
        }
        mean.mapv_inplace(|v| v / n as f64);

        let mut axes: Vec<Array1<f64>> = Vec::with_capacity(COMPONENTS);
        for component in 0..COMPONENTS {
            let axis = self.principal_axis(matrix, &mean, &axes, component);
            axes.push(axis);
        }

        let offsets: Vec<f64> = axes.iter().map(|a| mean.dot(a)).collect();
        Ok(matrix
            .iter()
            .map(|row| {
                [
                    row.dot_dense(axes[0].view()) - offsets[0],
                    row.dot_dense(axes[1].view()) - offsets[1],
                ]
            })
            .collect())
    }

    fn principal_axis(
        &self,
        matrix: &FeatureMatrix,
        mean: &Array1<f64>,
        found: &[Array1<f64>],
        component: usize,
    ) -> Array1<f64> {
        let d = mean.len();
        let mut v = start_vector(d, component);
        orthogonalize(&mut v, found);
        if !normalize(&mut v) {
            return Array1::zeros(d);
        }

        for iteration in 0..self.max_iterations {
            let mut w = covariance_product(matrix, mean, &v);
            orthogonalize(&mut w, found);
            if !normalize(&mut w) {
                // No variance left outside the axes already found.
                return Array1::zeros(d);
            }
            let change: f64 = (&w - &v).mapv(|x| x * x).sum();
            v = w;
            if change < self.tolerance {
                debug!(component, iteration, "PCA axis converged");
                break;
            }
        }

        fix_sign(&mut v);
        v
    }
}

/// Σ xᵢ (xᵢ·v) − n μ (μ·v)
fn covariance_product(matrix: &FeatureMatrix, mean: &Array1<f64>, v: &Array1<f64>) -> Array1<f64> {
    let mut out = Array1::<f64>::zeros(v.len());
    for row in matrix.iter() {
        let proj = row.dot_dense(v.view());
        if proj != 0.0 {
            for (j, x) in row.iter() {
                out[j] += x * proj;
            }
        }
    }
    let shift = matrix.n_rows() as f64 * mean.dot(v);
    out.scaled_add(-shift, mean);
    out
}

fn orthogonalize(v: &mut Array1<f64>, axes: &[Array1<f64>]) {
    for axis in axes {
        let overlap = v.dot(axis);
        v.scaled_add(-overlap, axis);
    }
}

/// Scale to unit length; false when the vector is (numerically) zero.
fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(v).sqrt();
    if norm < 1e-12 {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}

/// Fixed, non-degenerate starting point; different per component.
fn start_vector(d: usize, component: usize) -> Array1<f64> {
    Array1::from_iter((0..d).map(|j| {
        let h = (j as u64 * 7919 + component as u64 * 104_729 + 1) % 1009;
        1.0 + h as f64 / 1009.0
    }))
}

/// Flip so the largest-magnitude coordinate is positive.
fn fix_sign(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::sparse::SparseVector;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        FeatureMatrix::from_rows(
            rows[0].len(),
            rows.iter().map(|r| SparseVector::from_dense(r)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_one_point_per_row() {
        let m = matrix(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let points = Pca::default().fit_transform(&m).unwrap();
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }

    #[test]
    fn test_deterministic() {
        let m = matrix(&[&[1.0, 0.2, 0.0], &[0.0, 1.0, 0.4], &[0.3, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
        let a = Pca::default().fit_transform(&m).unwrap();
        let b = Pca::default().fit_transform(&m).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_axis_follows_the_spread() {
        // Variance lies along feature 0; feature 1 barely moves.
        let m = matrix(&[&[-2.0, 0.1], &[-1.0, -0.1], &[1.0, -0.1], &[2.0, 0.1]]);
        let points = Pca::default().fit_transform(&m).unwrap();
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        assert!((xs[0] + 2.0).abs() < 1e-6, "{xs:?}");
        assert!((xs[3] - 2.0).abs() < 1e-6, "{xs:?}");
        let centered_sum: f64 = xs.iter().sum();
        assert!(centered_sum.abs() < 1e-9);
    }

    #[test]
    fn test_single_row_at_origin() {
        let m = matrix(&[&[1.0, 2.0]]);
        assert_eq!(Pca::default().fit_transform(&m).unwrap(), vec![[0.0, 0.0]]);
    }
}
