// Batch clustering: load → normalize → vectorize → partition → report.
//
// Writes three artifacts into the output directory:
//   clusters_revealed.csv   title, cluster_id, description per document
//   cluster_summary.json    k, inertia, per-cluster keywords and examples
//   cluster_plot.svg        PCA scatter colored by cluster (best effort)

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clustering::keywords::DEFAULT_KEYWORDS;
use crate::clustering::model::{ClusterModel, ClusterSummary};
use crate::config::Config;
use crate::dataset::{self, Document};
use crate::output::plot::render_cluster_scatter;
use crate::output::summary::SummaryReport;
use crate::output::terminal;

pub const LABELS_FILE: &str = "clusters_revealed.csv";
pub const SUMMARY_FILE: &str = "cluster_summary.json";
pub const SCATTER_FILE: &str = "cluster_plot.svg";

/// Example titles listed per cluster in the batch report.
const EXAMPLES_PER_CLUSTER: usize = 3;

/// What a batch run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub model: ClusterModel,
    pub summaries: Vec<ClusterSummary>,
    pub labels_path: PathBuf,
    pub summary_path: PathBuf,
    /// None when the chart could not be rendered
    pub plot_path: Option<PathBuf>,
}

/// Run the full pipeline once with the configured k.
pub fn run(config: &Config) -> Result<BatchOutcome> {
    let documents = dataset::load_documents(&config.data_path)?;
    println!("Loaded {} titles.", documents.len());
    cluster_documents(&documents, config)
}

/// Cluster already-loaded documents and write every artifact.
pub fn cluster_documents(documents: &[Document], config: &Config) -> Result<BatchOutcome> {
    println!("Clustering into {} categories...", config.k);
    let model = ClusterModel::fit(documents, &config.cluster_settings(), config.k)?;
    let summaries = model.summaries(DEFAULT_KEYWORDS, EXAMPLES_PER_CLUSTER)?;
    terminal::display_cluster_summaries(&summaries);

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let labels_path = config.output_dir.join(LABELS_FILE);
    write_labels(&labels_path, documents, model.labels())?;
    println!("Results saved to {}", labels_path.display());

    let summary_path = config.output_dir.join(SUMMARY_FILE);
    SummaryReport::new(&model, summaries.clone())?.write(&summary_path)?;
    println!("Summary saved to {}", summary_path.display());

    let plot_path = config.output_dir.join(SCATTER_FILE);
    let plot_path = match render_scatter(&model, &plot_path) {
        Ok(()) => {
            println!("Map saved to {}", plot_path.display());
            Some(plot_path)
        }
        Err(e) => {
            warn!(error = %e, "Failed to render cluster plot");
            terminal::warn_user(&format!("could not render {}: {e:#}", plot_path.display()));
            None
        }
    };

    info!(k = model.k(), documents = documents.len(), "Batch run complete");

    Ok(BatchOutcome {
        model,
        summaries,
        labels_path,
        summary_path,
        plot_path,
    })
}

fn write_labels(path: &Path, documents: &[Document], labels: &[usize]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    dataset::write_labels(BufWriter::new(file), documents, labels)
        .with_context(|| format!("writing {}", path.display()))
}

fn render_scatter(model: &ClusterModel, path: &Path) -> Result<()> {
    let points = model.projection()?;
    render_cluster_scatter(path, &points, model.labels(), model.k())
}
