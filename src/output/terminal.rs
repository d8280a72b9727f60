// Colored terminal output for cluster reports, classifications and sweeps.
//
// main.rs, the batch pipeline and the REPL delegate all formatting here.

use colored::Colorize;

use crate::clustering::model::{Classification, ClusterSummary};
use crate::clustering::selection::FitQualityCurve;

/// Display every cluster with its keywords and example titles.
pub fn display_cluster_summaries(summaries: &[ClusterSummary]) {
    if summaries.is_empty() {
        println!("No clusters to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Discovered Categories ({} clusters) ===", summaries.len()).bold()
    );

    for summary in summaries {
        println!(
            "\n  {} {}",
            format!("Category {}", summary.cluster_id).cyan().bold(),
            format!("({} titles)", summary.size).dimmed()
        );
        println!("    Keywords: {}", summary.keywords.join(", ").green());
        if !summary.examples.is_empty() {
            let examples: Vec<String> = summary
                .examples
                .iter()
                .map(|t| super::truncate_chars(t, 40))
                .collect();
            println!("    Examples: {}", examples.join(" | ").dimmed());
        }
    }
    println!();
}

/// Display where a classified plot summary landed.
pub fn display_classification(classification: &Classification) {
    println!(
        "\n  {} {}",
        "Predicted category:".bold(),
        classification.cluster_id.to_string().cyan().bold()
    );
    println!("  Keywords: {}", classification.keywords.join(", ").green());
    if !classification.examples.is_empty() {
        println!("  Similar titles:");
        for title in &classification.examples {
            println!("    - {title}");
        }
    }
    println!();
}

/// Display the inertia table produced by a sweep.
pub fn display_curve(curve: &FitQualityCurve) {
    println!("\n{}", "=== Inertia by k ===".bold());
    println!("  {:>4}  {:>14}  {:>10}", "k".dimmed(), "Inertia".dimmed(), "Drop".dimmed());
    println!("  {}", "-".repeat(32).dimmed());

    let mut previous: Option<f64> = None;
    for point in curve.iter() {
        let drop = previous
            .map(|p| format!("{:.3}", p - point.inertia))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:>4}  {:>14.3}  {:>10}", point.k, point.inertia, drop);
        previous = Some(point.inertia);
    }
    println!();
}

/// Display dataset and model size.
pub fn display_stats(documents: usize, k: usize, vocabulary: usize, inertia: f64) {
    println!("\n{}", "=== Stats ===".bold());
    println!("  Titles analyzed: {documents}");
    println!("  Categories:      {k}");
    println!("  Vocabulary:      {vocabulary} terms");
    println!("  Inertia:         {inertia:.3}");
    println!();
}

/// Non-fatal problem the user should see (e.g. a chart that failed to render).
pub fn warn_user(message: &str) {
    println!("  {} {}", "warning:".yellow().bold(), message.yellow());
}
