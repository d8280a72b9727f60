// Clustering — k-means partitioning, keywords, model selection, fitted models.

pub mod keywords;
pub mod kmeans;
pub mod model;
pub mod selection;

pub use keywords::top_terms;
pub use kmeans::{KMeans, KMeansConfig};
pub use model::{Classification, ClusterModel, ClusterSettings, ClusterSummary, ModelCache};
pub use selection::{sweep, CurvePoint, FitQualityCurve, ModelSelector};
