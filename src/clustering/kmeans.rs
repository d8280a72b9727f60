// K-means partitioner — Lloyd iterations from k-means++ seeding.
//
// Rows are sparse TF-IDF vectors, centroids are a dense K × |vocabulary|
// matrix. Distances use ‖x‖² − 2x·c + ‖c‖² so a row never has to be
// densified; each centroid's squared norm is computed once per iteration.
//
// A fit runs `n_init` independent restarts and keeps the one with the lowest
// inertia. Restart seeds are drawn from a ChaCha8 stream seeded with the
// caller's seed, so the same (seed, n_init) always yields the same labels.

use ndarray::{Array2, ArrayView1, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::{ClusterError, Result};
use crate::vectorize::sparse::{FeatureMatrix, SparseVector};

pub const DEFAULT_N_INIT: usize = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Tuning knobs for a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Independent restarts; the lowest-inertia run wins (default 10)
    pub n_init: usize,
    /// Upper bound on Lloyd iterations per restart (default 300)
    pub max_iterations: usize,
    /// Stop once the summed squared centroid movement drops below this
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_init: DEFAULT_N_INIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// K-means model. Unfitted until `fit` succeeds; a re-fit replaces
/// everything learned before.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    pub config: KMeansConfig,
    fitted: Option<FittedKMeans>,
}

#[derive(Debug, Clone)]
struct FittedKMeans {
    centroids: Array2<f64>,
    centroid_sq_norms: Vec<f64>,
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

/// Outcome of a single restart.
struct Run {
    centroids: Array2<f64>,
    centroid_sq_norms: Vec<f64>,
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Default configuration with a different restart count.
    pub fn with_n_init(n_init: usize) -> Self {
        Self::new(KMeansConfig {
            n_init,
            ..KMeansConfig::default()
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Partition `vectors` into `k` clusters and return one label per row.
    pub fn fit(&mut self, vectors: &FeatureMatrix, k: usize, seed: u64) -> Result<Vec<usize>> {
        self.fit_with_init(vectors, k, seed, None)
    }

    /// Like `fit`, with one extra candidate run started from `initial`
    /// (a k × n_features centroid matrix) alongside the random restarts.
    pub fn fit_with_init(
        &mut self,
        vectors: &FeatureMatrix,
        k: usize,
        seed: u64,
        initial: Option<Array2<f64>>,
    ) -> Result<Vec<usize>> {
        self.fitted = None;

        let n = vectors.n_rows();
        if k < 1 || k > n {
            return Err(ClusterError::InvalidClusterCount { k, documents: n });
        }
        if self.config.n_init == 0 {
            return Err(ClusterError::InvalidParameter(
                "n_init must be at least 1".to_string(),
            ));
        }
        if let Some(init) = &initial {
            if init.nrows() != k || init.ncols() != vectors.n_features() {
                return Err(ClusterError::InvalidParameter(format!(
                    "initial centroids are {}x{}, expected {}x{}",
                    init.nrows(),
                    init.ncols(),
                    k,
                    vectors.n_features()
                )));
            }
        }

        let mut seeder = ChaCha8Rng::seed_from_u64(seed);
        let mut best: Option<Run> = None;

        for restart in 0..self.config.n_init {
            let mut rng = ChaCha8Rng::seed_from_u64(seeder.random::<u64>());
            let init = kmeans_plus_plus(vectors, k, &mut rng);
            let run = lloyd(vectors, init, &self.config);
            debug!(restart, inertia = run.inertia, iterations = run.iterations, "k-means restart");
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        if let Some(init) = initial {
            let run = lloyd(vectors, init, &self.config);
            debug!(inertia = run.inertia, "k-means warm-start candidate");
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let best = best.ok_or_else(|| {
            ClusterError::InvalidParameter("k-means produced no candidate runs".to_string())
        })?;

        info!(
            k,
            documents = n,
            inertia = best.inertia,
            iterations = best.iterations,
            "Fitted k-means"
        );

        let labels = best.labels.clone();
        self.fitted = Some(FittedKMeans {
            centroids: best.centroids,
            centroid_sq_norms: best.centroid_sq_norms,
            labels: best.labels,
            inertia: best.inertia,
            iterations: best.iterations,
        });
        Ok(labels)
    }

    /// Nearest centroid for one vector; ties go to the lowest cluster id.
    pub fn predict(&self, vector: &SparseVector) -> Result<usize> {
        let fitted = self.fitted()?;
        if vector.dim() != fitted.centroids.ncols() {
            return Err(ClusterError::DimensionMismatch {
                expected: fitted.centroids.ncols(),
                actual: vector.dim(),
            });
        }
        Ok(nearest(vector, &fitted.centroids, &fitted.centroid_sq_norms).0)
    }

    pub fn predict_batch(&self, vectors: &FeatureMatrix) -> Result<Vec<usize>> {
        vectors.iter().map(|v| self.predict(v)).collect()
    }

    /// Learned centroids, K × n_features.
    pub fn centroids(&self) -> Result<&Array2<f64>> {
        Ok(&self.fitted()?.centroids)
    }

    /// Label of each fitted row.
    pub fn labels(&self) -> Result<&[usize]> {
        Ok(&self.fitted()?.labels)
    }

    /// Sum of squared distances from each row to its centroid.
    pub fn inertia(&self) -> Result<f64> {
        Ok(self.fitted()?.inertia)
    }

    /// Lloyd iterations used by the winning restart.
    pub fn iterations(&self) -> Result<usize> {
        Ok(self.fitted()?.iterations)
    }

    /// Number of clusters of the current fit.
    pub fn k(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.centroids.nrows())
    }

    /// Rows assigned to each cluster.
    pub fn cluster_sizes(&self) -> Result<Vec<usize>> {
        let fitted = self.fitted()?;
        let mut sizes = vec![0; fitted.centroids.nrows()];
        for &label in &fitted.labels {
            sizes[label] += 1;
        }
        Ok(sizes)
    }

    /// Starting centroids for a k+1 fit: the current centroids plus the row
    /// lying farthest from its own centroid. Seeding a larger fit this way
    /// guarantees it can do no worse than this one.
    pub fn grow_initialization(&self, vectors: &FeatureMatrix) -> Result<Array2<f64>> {
        let fitted = self.fitted()?;
        if vectors.n_features() != fitted.centroids.ncols() {
            return Err(ClusterError::DimensionMismatch {
                expected: fitted.centroids.ncols(),
                actual: vectors.n_features(),
            });
        }

        let mut farthest = 0;
        let mut farthest_dist = f64::NEG_INFINITY;
        for (i, row) in vectors.iter().enumerate() {
            let d = nearest(row, &fitted.centroids, &fitted.centroid_sq_norms).1;
            if d > farthest_dist {
                farthest = i;
                farthest_dist = d;
            }
        }

        let mut grown = fitted.centroids.clone();
        let point = vectors
            .row(farthest)
            .map(SparseVector::to_dense)
            .ok_or(ClusterError::InvalidClusterCount {
                k: fitted.centroids.nrows() + 1,
                documents: vectors.n_rows(),
            })?;
        grown
            .push_row(point.view())
            .map_err(|e| ClusterError::InvalidParameter(e.to_string()))?;
        Ok(grown)
    }

    fn fitted(&self) -> Result<&FittedKMeans> {
        self.fitted.as_ref().ok_or(ClusterError::NotFitted("KMeans"))
    }
}

/// k-means++ seeding: first centroid uniform, each next one drawn with
/// probability proportional to squared distance from the nearest chosen one.
fn kmeans_plus_plus(vectors: &FeatureMatrix, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
    let n = vectors.n_rows();
    let dim = vectors.n_features();
    let rows = vectors.rows();
    let mut centroids = Array2::zeros((k, dim));

    let first = rng.random_range(0..n);
    set_row(&mut centroids, 0, &rows[first]);
    let mut closest: Vec<f64> = rows
        .iter()
        .map(|r| sparse_sq_distance(r, &rows[first]))
        .collect();

    for c in 1..k {
        let total: f64 = closest.iter().sum();
        let chosen = if total <= 0.0 {
            // Every row already coincides with a centroid.
            rng.random_range(0..n)
        } else {
            let threshold = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut selected = None;
            for (i, &d) in closest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                cumulative += d;
                selected = Some(i);
                if cumulative >= threshold {
                    break;
                }
            }
            selected.unwrap_or(first)
        };

        set_row(&mut centroids, c, &rows[chosen]);
        for (i, row) in rows.iter().enumerate() {
            let d = sparse_sq_distance(row, &rows[chosen]);
            if d < closest[i] {
                closest[i] = d;
            }
        }
    }

    centroids
}

/// Lloyd iterations from the given starting centroids.
fn lloyd(vectors: &FeatureMatrix, mut centroids: Array2<f64>, config: &KMeansConfig) -> Run {
    let k = centroids.nrows();
    let dim = centroids.ncols();
    let mut iterations = 0;

    for iter in 0..config.max_iterations {
        iterations = iter + 1;
        let sq_norms = squared_norms(&centroids);
        let (labels, mut distances) = assign(vectors, &centroids, &sq_norms);

        let mut sums = Array2::<f64>::zeros((k, dim));
        let mut counts = vec![0usize; k];
        for (row, &label) in vectors.iter().zip(&labels) {
            counts[label] += 1;
            for (j, v) in row.iter() {
                sums[[label, j]] += v;
            }
        }

        for (c, count) in counts.iter().enumerate() {
            if *count > 0 {
                let scale = 1.0 / *count as f64;
                sums.row_mut(c).mapv_inplace(|v| v * scale);
            } else {
                // Empty cluster: move it onto the row that is currently
                // worst served, and make sure no other empty cluster takes
                // the same row.
                let (far, _) = distances
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (i, &d)| {
                        if d > best.1 {
                            (i, d)
                        } else {
                            best
                        }
                    });
                if let Some(row) = vectors.row(far) {
                    set_row(&mut sums, c, row);
                }
                distances[far] = f64::NEG_INFINITY;
            }
        }

        let shift: f64 = (&sums - &centroids).mapv(|d| d * d).sum();
        centroids = sums;
        if shift <= config.tolerance {
            break;
        }
    }

    let centroid_sq_norms = squared_norms(&centroids);
    let (labels, distances) = assign(vectors, &centroids, &centroid_sq_norms);
    let inertia = distances.iter().sum();

    Run {
        centroids,
        centroid_sq_norms,
        labels,
        inertia,
        iterations,
    }
}

/// Nearest centroid for every row, plus each row's squared distance to it.
fn assign(
    vectors: &FeatureMatrix,
    centroids: &Array2<f64>,
    sq_norms: &[f64],
) -> (Vec<usize>, Vec<f64>) {
    vectors
        .iter()
        .map(|row| nearest(row, centroids, sq_norms))
        .unzip()
}

/// (cluster id, squared distance) of the closest centroid. Strict `<` keeps
/// the lowest id on ties.
fn nearest(row: &SparseVector, centroids: &Array2<f64>, sq_norms: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.axis_iter(Axis(0)).enumerate() {
        let d = row.squared_distance_to(centroid, sq_norms[c]);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

fn squared_norms(centroids: &Array2<f64>) -> Vec<f64> {
    centroids
        .axis_iter(Axis(0))
        .map(|c: ArrayView1<f64>| c.dot(&c))
        .collect()
}

fn set_row(matrix: &mut Array2<f64>, r: usize, row: &SparseVector) {
    let mut target = matrix.row_mut(r);
    target.fill(0.0);
    for (j, v) in row.iter() {
        target[j] = v;
    }
}

fn sparse_sq_distance(a: &SparseVector, b: &SparseVector) -> f64 {
    let dense = b.to_dense();
    a.squared_distance_to(dense.view(), b.squared_norm())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let dim = rows[0].len();
        FeatureMatrix::from_rows(dim, rows.iter().map(|r| SparseVector::from_dense(r)).collect())
            .unwrap()
    }

    fn two_blobs() -> FeatureMatrix {
        matrix(&[
            &[1.0, 0.0, 0.0],
            &[0.9, 0.1, 0.0],
            &[0.95, 0.05, 0.0],
            &[0.0, 0.0, 1.0],
            &[0.0, 0.1, 0.9],
            &[0.05, 0.0, 0.95],
        ])
    }

    #[test]
    fn test_fit_separates_blobs() {
        let mut km = KMeans::default();
        let labels = km.fit(&two_blobs(), 2, 42).unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_equidistant_point_goes_to_lowest_id() {
        let mut km = KMeans::default();
        km.fit(&matrix(&[&[1.0, 0.0], &[0.0, 1.0]]), 2, 42).unwrap();
        let midpoint = SparseVector::from_dense(&[0.5, 0.5]);
        assert_eq!(km.predict(&midpoint).unwrap(), 0);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let m = two_blobs();
        let a = KMeans::default().fit(&m, 3, 7).unwrap();
        let b = KMeans::default().fit(&m, 3, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_fitted_row_returns_its_label() {
        let m = two_blobs();
        let mut km = KMeans::default();
        let labels = km.fit(&m, 2, 1).unwrap();
        for (row, label) in m.iter().zip(labels) {
            assert_eq!(km.predict(row).unwrap(), label);
        }
    }

    #[test]
    fn test_invalid_cluster_counts() {
        let m = two_blobs();
        let mut km = KMeans::default();
        assert!(matches!(
            km.fit(&m, 0, 1),
            Err(ClusterError::InvalidClusterCount { k: 0, documents: 6 })
        ));
        assert!(matches!(
            km.fit(&m, 7, 1),
            Err(ClusterError::InvalidClusterCount { k: 7, documents: 6 })
        ));
        assert!(!km.is_fitted());
    }

    #[test]
    fn test_unfitted_queries_fail() {
        let km = KMeans::default();
        let v = SparseVector::from_dense(&[1.0, 0.0, 0.0]);
        assert!(matches!(km.predict(&v), Err(ClusterError::NotFitted(_))));
        assert!(matches!(km.centroids(), Err(ClusterError::NotFitted(_))));
    }

    #[test]
    fn test_predict_rejects_foreign_dimension() {
        let mut km = KMeans::default();
        km.fit(&two_blobs(), 2, 1).unwrap();
        let v = SparseVector::from_dense(&[1.0, 0.0]);
        assert!(matches!(
            km.predict(&v),
            Err(ClusterError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_k_equals_n_has_zero_inertia() {
        let m = two_blobs();
        let mut km = KMeans::default();
        km.fit(&m, 6, 3).unwrap();
        assert!(km.inertia().unwrap() < 1e-12);
    }

    #[test]
    fn test_refit_replaces_previous_model() {
        let m = two_blobs();
        let mut km = KMeans::default();
        km.fit(&m, 2, 1).unwrap();
        km.fit(&m, 3, 1).unwrap();
        assert_eq!(km.k(), Some(3));
        assert_eq!(km.centroids().unwrap().nrows(), 3);
        assert_eq!(km.cluster_sizes().unwrap().iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_grown_initialization_never_worse() {
        let m = two_blobs();
        let mut small = KMeans::with_n_init(1);
        small.fit(&m, 2, 5).unwrap();
        let init = small.grow_initialization(&m).unwrap();
        assert_eq!(init.nrows(), 3);

        let mut big = KMeans::with_n_init(1);
        big.fit_with_init(&m, 3, 5, Some(init)).unwrap();
        assert!(big.inertia().unwrap() <= small.inertia().unwrap() + 1e-12);
    }
}
