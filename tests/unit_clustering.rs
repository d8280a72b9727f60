// Unit tests for k-means, keyword extraction, model selection and PCA.
//
// Feature matrices are built by hand so the geometry is known exactly.

use plotline::clustering::kmeans::KMeans;
use plotline::clustering::keywords::top_terms;
use plotline::clustering::selection::{sweep, ModelSelector};
use plotline::projection::Pca;
use plotline::vectorize::{FeatureMatrix, SparseVector};
use plotline::ClusterError;

fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
    FeatureMatrix::from_rows(
        rows[0].len(),
        rows.iter().map(|r| SparseVector::from_dense(r)).collect(),
    )
    .unwrap()
}

fn three_groups() -> FeatureMatrix {
    matrix(&[
        &[1.0, 0.0, 0.0, 0.0],
        &[0.9, 0.1, 0.0, 0.0],
        &[0.8, 0.0, 0.2, 0.0],
        &[0.0, 1.0, 0.0, 0.1],
        &[0.1, 0.9, 0.0, 0.0],
        &[0.0, 0.8, 0.1, 0.1],
        &[0.0, 0.0, 1.0, 0.2],
        &[0.0, 0.1, 0.9, 0.3],
        &[0.1, 0.0, 0.8, 0.0],
        &[0.0, 0.0, 0.1, 1.0],
        &[0.2, 0.0, 0.0, 0.9],
        &[0.0, 0.2, 0.0, 0.8],
    ])
}

// ============================================================
// KMeans
// ============================================================

#[test]
fn kmeans_is_deterministic_for_seed() {
    let m = three_groups();
    let a = KMeans::default().fit(&m, 4, 42).unwrap();
    let b = KMeans::default().fit(&m, 4, 42).unwrap();
    assert_eq!(a, b);
}

#[test]
fn kmeans_predicts_fitted_rows_to_their_labels() {
    let m = three_groups();
    let mut km = KMeans::default();
    let labels = km.fit(&m, 4, 9).unwrap();
    assert_eq!(km.predict_batch(&m).unwrap(), labels);
}

#[test]
fn kmeans_labels_in_range_and_centroid_shape() {
    let m = three_groups();
    let mut km = KMeans::default();
    let labels = km.fit(&m, 3, 1).unwrap();
    assert!(labels.iter().all(|&l| l < 3));
    assert_eq!(km.centroids().unwrap().dim(), (3, 4));
    assert!(km.iterations().unwrap() >= 1);
}

#[test]
fn kmeans_rejects_k_zero_and_k_above_n() {
    let m = three_groups();
    assert!(matches!(
        KMeans::default().fit(&m, 0, 1),
        Err(ClusterError::InvalidClusterCount { .. })
    ));
    assert!(matches!(
        KMeans::default().fit(&m, 13, 1),
        Err(ClusterError::InvalidClusterCount { k: 13, documents: 12 })
    ));
}

#[test]
fn kmeans_rejects_wrong_dimension() {
    let mut km = KMeans::default();
    km.fit(&three_groups(), 2, 1).unwrap();
    let v = SparseVector::from_dense(&[1.0, 0.0, 0.0]);
    assert!(matches!(
        km.predict(&v),
        Err(ClusterError::DimensionMismatch { expected: 4, actual: 3 })
    ));
}

#[test]
fn kmeans_handles_duplicate_points() {
    // Fewer distinct points than clusters forces empty-cluster handling.
    let m = matrix(&[&[1.0, 0.0], &[1.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]]);
    let mut km = KMeans::with_n_init(3);
    let labels = km.fit(&m, 3, 5).unwrap();
    assert_eq!(labels.len(), 4);
    assert!(km.inertia().unwrap() < 1e-12);
}

// ============================================================
// Keyword extraction
// ============================================================

#[test]
fn top_terms_returns_n_when_vocabulary_is_large_enough() {
    let vocab: Vec<String> = ["alien", "bank", "chef", "dragon", "heist", "robot", "spy"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let centroid = ndarray::array![0.1, 0.5, 0.0, 0.3, 0.9, 0.2, 0.4];
    let terms = top_terms(centroid.view(), &vocab, 5);
    assert_eq!(terms, vec!["heist", "bank", "spy", "dragon", "robot"]);
}

#[test]
fn top_terms_returns_whole_vocabulary_when_n_exceeds_it() {
    let vocab: Vec<String> = vec!["ghost".into(), "witch".into()];
    let centroid = ndarray::array![0.1, 0.2];
    assert_eq!(top_terms(centroid.view(), &vocab, 50).len(), 2);
}

// ============================================================
// Model selection
// ============================================================

#[test]
fn sweep_inertia_never_increases() {
    let curve = sweep(&three_groups(), 2..=10, 42).unwrap();
    assert_eq!(curve.len(), 9);
    for pair in curve.points.windows(2) {
        assert!(
            pair[1].inertia <= pair[0].inertia + 1e-9,
            "inertia rose from k={} to k={}",
            pair[0].k,
            pair[1].k
        );
    }
}

#[test]
fn sweep_with_single_restart_stays_monotone() {
    let curve = ModelSelector::new(1).sweep(&three_groups(), 1..=12, 3).unwrap();
    for pair in curve.points.windows(2) {
        assert!(pair[1].inertia <= pair[0].inertia + 1e-9);
    }
    assert!(curve.points[11].inertia < 1e-9);
}

// ============================================================
// PCA
// ============================================================

#[test]
fn pca_gives_one_finite_point_per_row_deterministically() {
    let m = three_groups();
    let a = Pca::default().fit_transform(&m).unwrap();
    let b = Pca::default().fit_transform(&m).unwrap();
    assert_eq!(a.len(), 12);
    assert_eq!(a, b);
    assert!(a.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
}

#[test]
fn pca_projection_is_centered() {
    let points = Pca::default().fit_transform(&three_groups()).unwrap();
    let sx: f64 = points.iter().map(|p| p[0]).sum();
    let sy: f64 = points.iter().map(|p| p[1]).sum();
    assert!(sx.abs() < 1e-9 && sy.abs() < 1e-9);
}
