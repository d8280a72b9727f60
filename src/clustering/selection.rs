// Model selection — inertia as a function of k (the "elbow" curve).
//
// Each k gets a fresh k-means fit with fewer restarts than a production fit.
// When k follows k-1 directly, one extra candidate starts from the k-1
// winner's centroids plus its worst-served point. Lloyd iterations never
// raise inertia, so that candidate alone keeps the curve non-increasing.
//
// The selector records the curve and nothing else; picking the elbow is left
// to whoever reads the plot.

use serde::Serialize;
use tracing::info;

use super::kmeans::KMeans;
use crate::error::{ClusterError, Result};
use crate::vectorize::sparse::FeatureMatrix;

/// Restarts per k during a sweep.
pub const DEFAULT_SWEEP_N_INIT: usize = 5;

/// One sample of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub k: usize,
    pub inertia: f64,
}

/// Ordered (k, inertia) pairs, ascending in k.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitQualityCurve {
    pub points: Vec<CurvePoint>,
}

impl FitQualityCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurvePoint> {
        self.points.iter()
    }

    pub fn ks(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.k).collect()
    }

    pub fn inertias(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.inertia).collect()
    }
}

/// Sweeps k and records fit quality.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    pub n_init: usize,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            n_init: DEFAULT_SWEEP_N_INIT,
        }
    }
}

impl ModelSelector {
    pub fn new(n_init: usize) -> Self {
        Self { n_init }
    }

    pub fn sweep<I>(&self, vectors: &FeatureMatrix, k_range: I, seed: u64) -> Result<FitQualityCurve>
    where
        I: IntoIterator<Item = usize>,
    {
        self.sweep_with_progress(vectors, k_range, seed, |_| {})
    }

    /// Sweep, calling `on_fit` after each k is done.
    pub fn sweep_with_progress<I, F>(
        &self,
        vectors: &FeatureMatrix,
        k_range: I,
        seed: u64,
        mut on_fit: F,
    ) -> Result<FitQualityCurve>
    where
        I: IntoIterator<Item = usize>,
        F: FnMut(&CurvePoint),
    {
        let ks: Vec<usize> = k_range.into_iter().collect();
        validate_range(&ks, vectors.n_rows())?;

        let mut curve = FitQualityCurve::default();
        let mut previous: Option<KMeans> = None;

        for &k in &ks {
            let warm_start = match &previous {
                Some(prev) if prev.k() == Some(k - 1) => Some(prev.grow_initialization(vectors)?),
                _ => None,
            };

            let mut model = KMeans::with_n_init(self.n_init);
            model.fit_with_init(vectors, k, seed, warm_start)?;
            let point = CurvePoint {
                k,
                inertia: model.inertia()?,
            };
            info!(k, inertia = point.inertia, "Sweep point");
            on_fit(&point);
            curve.points.push(point);
            previous = Some(model);
        }

        Ok(curve)
    }
}

/// Sweep with the default number of restarts per k.
pub fn sweep<I>(vectors: &FeatureMatrix, k_range: I, seed: u64) -> Result<FitQualityCurve>
where
    I: IntoIterator<Item = usize>,
{
    ModelSelector::default().sweep(vectors, k_range, seed)
}

fn validate_range(ks: &[usize], documents: usize) -> Result<()> {
    if ks.is_empty() {
        return Err(ClusterError::InvalidParameter(
            "k range is empty".to_string(),
        ));
    }
    for &k in ks {
        if k < 1 || k > documents {
            return Err(ClusterError::InvalidClusterCount { k, documents });
        }
    }
    if ks.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ClusterError::InvalidParameter(
            "k range must be strictly ascending".to_string(),
        ));
    }
    Ok(())
}
