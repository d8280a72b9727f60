// Plotline: unsupervised semantic categories for movie plot summaries
//
// This is the library root. Each module corresponds to one stage of the
// normalize → vectorize → cluster → explain pipeline, plus the surfaces
// (batch pipelines, REPL, JSON API) built on top.

pub mod clustering;
pub mod config;
pub mod dataset;
pub mod error;
pub mod explorer;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod text;
pub mod vectorize;

#[cfg(feature = "web")]
pub mod web;

pub use error::{ClusterError, Result};
