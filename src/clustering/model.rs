// Fitted cluster models and the per-k cache the explorers share.
//
// A ClusterModel bundles everything one fit produced: the vectorizer with its
// vocabulary, the k-means partitioner with its centroids, the feature matrix
// and one label per document. It is never mutated after `fit`; a different k
// is a different model.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::keywords::top_terms;
use super::kmeans::{KMeans, DEFAULT_N_INIT};
use crate::dataset::Document;
use crate::error::{ClusterError, Result};
use crate::projection::Pca;
use crate::text::TextNormalizer;
use crate::vectorize::sparse::FeatureMatrix;
use crate::vectorize::tfidf::{TfIdfVectorizer, DEFAULT_MAX_FEATURES};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Knobs shared by every fit in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub max_features: usize,
    pub n_init: usize,
    pub seed: u64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            n_init: DEFAULT_N_INIT,
            seed: DEFAULT_SEED,
        }
    }
}

/// Where an unseen plot summary landed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub cluster_id: usize,
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
}

/// One cluster's card: size, strongest terms, a few member titles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub size: usize,
    pub keywords: Vec<String>,
    pub examples: Vec<String>,
}

/// Immutable result of clustering a corpus at one k.
#[derive(Debug)]
pub struct ClusterModel {
    k: usize,
    vectorizer: TfIdfVectorizer,
    kmeans: KMeans,
    features: FeatureMatrix,
    labels: Vec<usize>,
    titles: Vec<String>,
}

impl ClusterModel {
    /// Vectorize the documents' normalized text and partition it into `k`
    /// clusters.
    pub fn fit(documents: &[Document], settings: &ClusterSettings, k: usize) -> Result<Self> {
        if k < 1 || k > documents.len() {
            return Err(ClusterError::InvalidClusterCount {
                k,
                documents: documents.len(),
            });
        }

        let corpus: Vec<&str> = documents.iter().map(|d| d.normalized.as_str()).collect();
        let mut vectorizer = TfIdfVectorizer::new(settings.max_features);
        let features = vectorizer.fit_transform(&corpus)?;

        let mut kmeans = KMeans::with_n_init(settings.n_init);
        let labels = kmeans.fit(&features, k, settings.seed)?;

        info!(k, documents = documents.len(), "Cluster model ready");

        Ok(Self {
            k,
            vectorizer,
            kmeans,
            features,
            labels,
            titles: documents.iter().map(|d| d.title.clone()).collect(),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn document_count(&self) -> usize {
        self.labels.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        self.vectorizer.vocabulary().unwrap_or_default()
    }

    pub fn centroids(&self) -> Result<&ndarray::Array2<f64>> {
        self.kmeans.centroids()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn inertia(&self) -> Result<f64> {
        self.kmeans.inertia()
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn kmeans(&self) -> &KMeans {
        &self.kmeans
    }

    /// Top `n` terms of a cluster's centroid.
    pub fn keywords(&self, cluster: usize, n: usize) -> Result<Vec<String>> {
        let centroids = self.kmeans.centroids()?;
        if cluster >= centroids.nrows() {
            return Err(ClusterError::InvalidParameter(format!(
                "cluster {cluster} does not exist (k={})",
                self.k
            )));
        }
        Ok(top_terms(centroids.row(cluster), self.vocabulary(), n))
    }

    /// Document indices assigned to `cluster`, in corpus order.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// First `n` titles of a cluster, in corpus order.
    pub fn example_titles(&self, cluster: usize, n: usize) -> Vec<String> {
        self.members(cluster)
            .into_iter()
            .take(n)
            .map(|i| self.titles[i].clone())
            .collect()
    }

    /// Assign an unseen plot summary to a cluster.
    pub fn classify(&self, text: &str, n_keywords: usize, n_examples: usize) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(ClusterError::EmptyInput);
        }
        let normalized = TextNormalizer::new().normalize_str(text);
        let vector = self.vectorizer.transform_one(&normalized)?;
        let cluster_id = self.kmeans.predict(&vector)?;
        debug!(cluster_id, terms = vector.nnz(), "Classified text");

        Ok(Classification {
            cluster_id,
            keywords: self.keywords(cluster_id, n_keywords)?,
            examples: self.example_titles(cluster_id, n_examples),
        })
    }

    /// One summary per cluster, in id order.
    pub fn summaries(&self, n_keywords: usize, n_examples: usize) -> Result<Vec<ClusterSummary>> {
        let sizes = self.kmeans.cluster_sizes()?;
        (0..self.k)
            .map(|cluster_id| {
                Ok(ClusterSummary {
                    cluster_id,
                    size: sizes[cluster_id],
                    keywords: self.keywords(cluster_id, n_keywords)?,
                    examples: self.example_titles(cluster_id, n_examples),
                })
            })
            .collect()
    }

    /// 2-D PCA coordinates, one per document.
    pub fn projection(&self) -> Result<Vec<[f64; 2]>> {
        Pca::default().fit_transform(&self.features)
    }
}

/// Fitted models keyed by k, least recently used evicted first.
#[derive(Debug)]
pub struct ModelCache {
    capacity: usize,
    // Most recently used last.
    entries: Vec<(usize, Arc<ClusterModel>)>,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ModelCache {
    /// A cache holding at most `capacity` models (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, k: usize) -> bool {
        self.entries.iter().any(|(key, _)| *key == k)
    }

    /// Look up without touching recency (usable under a read lock).
    pub fn peek(&self, k: usize) -> Option<Arc<ClusterModel>> {
        self.entries
            .iter()
            .find(|(key, _)| *key == k)
            .map(|(_, model)| Arc::clone(model))
    }

    /// Look up and mark as most recently used.
    pub fn get(&mut self, k: usize) -> Option<Arc<ClusterModel>> {
        let pos = self.entries.iter().position(|(key, _)| *key == k)?;
        let entry = self.entries.remove(pos);
        let model = Arc::clone(&entry.1);
        self.entries.push(entry);
        Some(model)
    }

    /// Insert or replace the model for `k`, evicting the least recently used
    /// entry when full.
    pub fn insert(&mut self, k: usize, model: Arc<ClusterModel>) {
        self.entries.retain(|(key, _)| *key != k);
        if self.entries.len() >= self.capacity {
            let (evicted, _) = self.entries.remove(0);
            debug!(k = evicted, "Evicted cached model");
        }
        self.entries.push((k, model));
    }

    /// Cached model for `k`, fitting and caching it on a miss.
    pub fn get_or_fit(
        &mut self,
        documents: &[Document],
        settings: &ClusterSettings,
        k: usize,
    ) -> Result<Arc<ClusterModel>> {
        if let Some(model) = self.get(k) {
            return Ok(model);
        }
        let model = Arc::new(ClusterModel::fit(documents, settings, k)?);
        self.insert(k, Arc::clone(&model));
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("Star Drift", "An astronaut repairs a rocket in orbit around a distant planet"),
            Document::new("Red Giant", "A rocket crew explores the galaxy searching for a habitable planet"),
            Document::new("Deep Orbit", "Stranded astronaut signals from orbit as the galaxy burns"),
            Document::new("Pasta Wars", "A chef battles rivals in a kitchen with garlic pasta"),
            Document::new("Sauce Boss", "Young chef perfects a secret garlic sauce recipe"),
            Document::new("Kitchen Nights", "The kitchen staff cook pasta sauce for a famous chef"),
        ]
    }

    fn settings() -> ClusterSettings {
        ClusterSettings {
            n_init: 4,
            ..ClusterSettings::default()
        }
    }

    #[test]
    fn test_fit_and_summaries() {
        let model = ClusterModel::fit(&corpus(), &settings(), 2).unwrap();
        assert_eq!(model.k(), 2);
        assert_eq!(model.labels().len(), 6);
        let summaries = model.summaries(5, 3).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries.iter().map(|s| s.size).sum::<usize>(), 6);
        assert!(summaries.iter().all(|s| s.keywords.len() == 5));
    }

    #[test]
    fn test_classify_rejects_blank_text() {
        let model = ClusterModel::fit(&corpus(), &settings(), 2).unwrap();
        assert!(matches!(model.classify("   ", 10, 5), Err(ClusterError::EmptyInput)));
    }

    #[test]
    fn test_classify_lands_with_similar_plots() {
        let model = ClusterModel::fit(&corpus(), &settings(), 2).unwrap();
        let c = model.classify("A chef cooks garlic pasta", 10, 5).unwrap();
        assert_eq!(c.cluster_id, model.labels()[3]);
        assert!(c.examples.contains(&"Pasta Wars".to_string()));
    }

    #[test]
    fn test_fit_rejects_k_above_documents() {
        assert!(matches!(
            ClusterModel::fit(&corpus(), &settings(), 7),
            Err(ClusterError::InvalidClusterCount { k: 7, documents: 6 })
        ));
    }

    #[test]
    fn test_cache_reuses_models() {
        let docs = corpus();
        let mut cache = ModelCache::new(2);
        let a = cache.get_or_fit(&docs, &settings(), 2).unwrap();
        let b = cache.get_or_fit(&docs, &settings(), 2).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let docs = corpus();
        let mut cache = ModelCache::new(2);
        cache.get_or_fit(&docs, &settings(), 2).unwrap();
        cache.get_or_fit(&docs, &settings(), 3).unwrap();
        // Touch k=2 so k=3 becomes the eviction candidate.
        assert!(cache.get(2).is_some());
        cache.get_or_fit(&docs, &settings(), 4).unwrap();
        assert!(cache.contains(2));
        assert!(!cache.contains(3));
        assert!(cache.contains(4));
    }
}
