// Keyword extraction — the terms a centroid weighs most heavily.

use ndarray::ArrayView1;

/// Keywords shown per cluster in full summaries.
pub const DEFAULT_KEYWORDS: usize = 10;

/// The `n` highest-weighted vocabulary terms of a centroid.
///
/// Ties keep ascending index order. Asking for more terms than the
/// vocabulary holds returns the whole vocabulary, ranked.
pub fn top_terms(centroid: ArrayView1<f64>, vocabulary: &[String], n: usize) -> Vec<String> {
    let len = centroid.len().min(vocabulary.len());
    let mut order: Vec<usize> = (0..len).collect();
    // sort_by is stable, so equal weights stay in index order.
    order.sort_by(|&a, &b| centroid[b].total_cmp(&centroid[a]));
    order
        .into_iter()
        .take(n)
        .map(|i| vocabulary[i].clone())
        .collect()
}
