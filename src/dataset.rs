// Dataset I/O — plot summaries in, labelled rows out.
//
// Input is a CSV with at least `title` and `description` columns; anything
// else in the file is ignored. Rows with a missing or blank title or
// description are skipped, so every Document has both.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClusterError, Result};
use crate::text::TextNormalizer;

/// A plot summary with its normalized form, computed once at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub description: String,
    #[serde(skip)]
    pub normalized: String,
}

impl Document {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        let normalized = TextNormalizer::new().normalize_str(&description);
        Self {
            title: title.into(),
            description,
            normalized,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    title: Option<String>,
    description: Option<String>,
}

/// One row of `clusters_revealed.csv`.
#[derive(Debug, Serialize)]
struct LabelledRow<'a> {
    title: &'a str,
    cluster_id: usize,
    description: &'a str,
}

/// Load documents from a CSV file.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(ClusterError::DatasetNotFound(path.to_path_buf()));
    }
    let documents = read_documents(File::open(path)?)?;
    info!(path = %path.display(), documents = documents.len(), "Loaded dataset");
    Ok(documents)
}

/// Parse documents from any CSV source.
pub fn read_documents<R: Read>(source: R) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for column in ["title", "description"] {
        if !headers.iter().any(|h| h == column) {
            return Err(ClusterError::MissingColumn(column));
        }
    }

    let mut documents = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<RawRow>() {
        let row = record?;
        match (non_blank(row.title), non_blank(row.description)) {
            (Some(title), Some(description)) => documents.push(Document::new(title, description)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "Dropped rows without title or description");
    }
    Ok(documents)
}

/// Write `title,cluster_id,description`, one row per document.
pub fn write_labels<W: Write>(sink: W, documents: &[Document], labels: &[usize]) -> Result<()> {
    if documents.len() != labels.len() {
        return Err(ClusterError::DimensionMismatch {
            expected: documents.len(),
            actual: labels.len(),
        });
    }
    let mut writer = csv::Writer::from_writer(sink);
    for (doc, &cluster_id) in documents.iter().zip(labels) {
        writer.serialize(LabelledRow {
            title: &doc.title,
            cluster_id,
            description: &doc.description,
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
