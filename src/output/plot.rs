// SVG charts — PCA scatter of the clustering and the elbow curve.
//
// Rendering is best effort: callers log and warn on failure, the numeric
// results and CSV/JSON artifacts do not depend on it.

use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;

use crate::clustering::selection::FitQualityCurve;

const SCATTER_SIZE: (u32, u32) = (1200, 800);
const ELBOW_SIZE: (u32, u32) = (1000, 600);

/// Scatter the 2-D projection, one color per cluster.
pub fn render_cluster_scatter(path: &Path, points: &[[f64; 2]], labels: &[usize], k: usize) -> Result<()> {
    if points.len() != labels.len() {
        bail!("{} points but {} labels", points.len(), labels.len());
    }

    let (x_range, y_range) = bounds(points);
    let root = SVGBackend::new(path, SCATTER_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Plot clusters (PCA projection)", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Component 1")
        .y_desc("Component 2")
        .draw()?;

    for cluster in 0..k {
        let color = Palette99::pick(cluster).to_rgba();
        let members = points
            .iter()
            .zip(labels)
            .filter(|(_, &label)| label == cluster)
            .map(|(p, _)| Circle::new((p[0], p[1]), 3, color.mix(0.6).filled()));
        chart
            .draw_series(members)?
            .label(format!("Cluster {cluster}"))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Inertia against k.
pub fn render_elbow_curve(path: &Path, curve: &FitQualityCurve) -> Result<()> {
    let (Some(first), Some(last)) = (curve.points.first(), curve.points.last()) else {
        bail!("cannot plot an empty curve");
    };
    let x_range = first.k as f64 - 0.5..last.k as f64 + 0.5;
    let y_max = curve.points.iter().map(|p| p.inertia).fold(0.0, f64::max);
    let y_range = 0.0..(y_max * 1.05).max(1e-9);

    let root = SVGBackend::new(path, ELBOW_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Elbow method: inertia by number of categories", ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Number of clusters (k)")
        .y_desc("Inertia")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    let samples: Vec<(f64, f64)> = curve.iter().map(|p| (p.k as f64, p.inertia)).collect();
    chart.draw_series(LineSeries::new(samples.iter().copied(), &BLUE))?;
    chart.draw_series(
        samples
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Padded axis ranges covering every point.
fn bounds(points: &[[f64; 2]]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for p in points {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let range = |axis: usize| {
        if !min[axis].is_finite() || !max[axis].is_finite() {
            return -1.0..1.0;
        }
        let pad = ((max[axis] - min[axis]) * 0.05).max(0.05);
        min[axis] - pad..max[axis] + pad
    };
    (range(0), range(1))
}
