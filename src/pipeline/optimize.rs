// Optimize: sweep k and chart inertia so a human can pick the elbow.
//
// Labels are not persisted; the only artifact is elbow_curve.svg.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::clustering::selection::{FitQualityCurve, ModelSelector};
use crate::config::Config;
use crate::dataset::{self, Document};
use crate::error::ClusterError;
use crate::output::plot::render_elbow_curve;
use crate::output::terminal;
use crate::vectorize::tfidf::TfIdfVectorizer;

pub const ELBOW_FILE: &str = "elbow_curve.svg";

/// Smallest k the sweep starts from.
const MIN_K: usize = 2;

#[derive(Debug)]
pub struct OptimizeOutcome {
    pub curve: FitQualityCurve,
    pub plot_path: Option<PathBuf>,
}

pub fn run(config: &Config) -> Result<OptimizeOutcome> {
    let documents = dataset::load_documents(&config.data_path)?;
    println!("Loaded {} titles.", documents.len());
    sweep_documents(&documents, config)
}

/// Sweep k = 2..=max_k (clamped to the document count) over loaded documents.
pub fn sweep_documents(documents: &[Document], config: &Config) -> Result<OptimizeOutcome> {
    let max_k = config.max_k.min(documents.len());
    if max_k < MIN_K {
        return Err(ClusterError::InvalidParameter(format!(
            "max_k must be at least {MIN_K} (got {}, with {} documents)",
            config.max_k,
            documents.len()
        ))
        .into());
    }

    let corpus: Vec<&str> = documents.iter().map(|d| d.normalized.as_str()).collect();
    let mut vectorizer = TfIdfVectorizer::new(config.max_features);
    let features = vectorizer.fit_transform(&corpus)?;

    println!("Testing k = {MIN_K}..={max_k} ({} restarts each)...", config.sweep_n_init);
    let pb = ProgressBar::new((max_k - MIN_K + 1) as u64);
    pb.set_style(ProgressStyle::default_bar().template("  Sweep [{bar:30}] {pos}/{len} k={msg} ({eta})")?);

    let selector = ModelSelector::new(config.sweep_n_init);
    let curve = selector.sweep_with_progress(&features, MIN_K..=max_k, config.seed, |point| {
        pb.set_message(point.k.to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    terminal::display_curve(&curve);

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let path = config.output_dir.join(ELBOW_FILE);
    let plot_path = match render_elbow_curve(&path, &curve) {
        Ok(()) => {
            println!("Elbow chart saved to {}", path.display());
            println!("Look for the bend where the curve starts to flatten.");
            Some(path)
        }
        Err(e) => {
            warn!(error = %e, "Failed to render elbow curve");
            terminal::warn_user(&format!("could not render {}: {e:#}", path.display()));
            None
        }
    };

    info!(points = curve.len(), "Sweep complete");
    Ok(OptimizeOutcome { curve, plot_path })
}
