// Vectorization — normalized text → sparse TF-IDF feature rows.

pub mod sparse;
pub mod tfidf;

pub use sparse::{FeatureMatrix, SparseVector};
pub use tfidf::TfIdfVectorizer;
