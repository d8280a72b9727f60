// Projection — 2-D coordinates for plotting documents.

pub mod pca;

pub use pca::Pca;
