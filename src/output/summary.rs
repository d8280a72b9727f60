// cluster_summary.json — machine-readable companion to the terminal report.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clustering::model::{ClusterModel, ClusterSummary};

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub k: usize,
    pub documents: usize,
    pub inertia: f64,
    pub clusters: Vec<ClusterSummary>,
}

impl SummaryReport {
    pub fn new(model: &ClusterModel, clusters: Vec<ClusterSummary>) -> Result<Self> {
        Ok(Self {
            generated_at: Utc::now(),
            k: model.k(),
            documents: model.document_count(),
            inertia: model.inertia()?,
            clusters,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
