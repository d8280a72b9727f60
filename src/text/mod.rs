// Text preprocessing — normalization and lemmatization of plot summaries.

pub mod lemmatizer;
pub mod normalizer;

pub use normalizer::TextNormalizer;
