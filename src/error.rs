// Typed errors for the clustering library.
//
// The binaries and orchestration layer work in anyhow and convert these
// with `?`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the normalization → vectorization → clustering core.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// A vectorizer or partitioner was queried before it was fitted.
    #[error("{0} is not fitted yet; call fit first")]
    NotFitted(&'static str),

    /// Requested cluster count is outside [1, number of documents].
    #[error("invalid cluster count k={k}: must be between 1 and {documents} (the document count)")]
    InvalidClusterCount { k: usize, documents: usize },

    /// Any other out-of-range or malformed parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A vector from a different feature space was passed to a fitted model.
    #[error("dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Fitting found no usable terms (every token was a stopword or too short).
    #[error("no terms left to build a vocabulary from; documents may be empty or all stopwords")]
    EmptyVocabulary,

    /// Text to classify was empty after trimming.
    #[error("input text is empty")]
    EmptyInput,

    /// The input dataset does not exist.
    #[error("dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    /// The dataset exists but lacks a required column.
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, ClusterError>;
