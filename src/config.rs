use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::clustering::kmeans::DEFAULT_N_INIT;
use crate::clustering::model::{ClusterSettings, DEFAULT_SEED};
use crate::clustering::selection::DEFAULT_SWEEP_N_INIT;
use crate::vectorize::tfidf::DEFAULT_MAX_FEATURES;

pub const DEFAULT_DATA_PATH: &str = "data/netflix_dataset.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_K: usize = 15;
pub const DEFAULT_MAX_K: usize = 30;

/// Smallest and largest k the explorers accept.
pub const EXPLORER_K_MIN: usize = 5;
pub const EXPLORER_K_MAX: usize = 25;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override whatever is set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV with `title` and `description` columns (PLOTLINE_DATA)
    pub data_path: PathBuf,
    /// Where CSV, JSON and SVG artifacts are written (PLOTLINE_OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Cluster count for `cluster` and the explorers' starting point
    pub k: usize,
    /// Upper end of the `optimize` sweep
    pub max_k: usize,
    pub seed: u64,
    /// Restarts per production fit
    pub n_init: usize,
    /// Restarts per k during a sweep
    pub sweep_n_init: usize,
    /// TF-IDF vocabulary cap
    pub max_features: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            k: DEFAULT_K,
            max_k: DEFAULT_MAX_K,
            seed: DEFAULT_SEED,
            n_init: DEFAULT_N_INIT,
            sweep_n_init: DEFAULT_SWEEP_N_INIT,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; a variable that is set but does not parse
    /// is an error rather than silently ignored.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            data_path: env::var("PLOTLINE_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            output_dir: env::var("PLOTLINE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            k: parse_var("PLOTLINE_K", defaults.k)?,
            max_k: parse_var("PLOTLINE_MAX_K", defaults.max_k)?,
            seed: parse_var("PLOTLINE_SEED", defaults.seed)?,
            n_init: parse_var("PLOTLINE_N_INIT", defaults.n_init)?,
            sweep_n_init: parse_var("PLOTLINE_SWEEP_N_INIT", defaults.sweep_n_init)?,
            max_features: parse_var("PLOTLINE_MAX_FEATURES", defaults.max_features)?,
        })
    }

    /// Library-side settings for a production fit.
    pub fn cluster_settings(&self) -> ClusterSettings {
        ClusterSettings {
            max_features: self.max_features,
            n_init: self.n_init,
            seed: self.seed,
        }
    }

    /// Check that the dataset file exists.
    /// Call this before any command that loads documents.
    pub fn require_dataset(&self) -> Result<()> {
        if !self.data_path.exists() {
            anyhow::bail!(
                "Dataset not found at {}\n\
                 Pass --data <PATH> or set PLOTLINE_DATA in your .env file.",
                self.data_path.display()
            );
        }
        Ok(())
    }

    /// Check that `k` is one the explorers will fit on demand.
    pub fn require_explorer_k(k: usize) -> Result<()> {
        if !(EXPLORER_K_MIN..=EXPLORER_K_MAX).contains(&k) {
            anyhow::bail!("k must be between {EXPLORER_K_MIN} and {EXPLORER_K_MAX}, got {k}");
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name}={raw:?} is not a valid number")),
        _ => Ok(default),
    }
}
