//! Tables and charts of benchmark results.
//!
//! Tables are semicolon separated CSV files, charts are SVG files.
use crate::bench::AggregateResult;
use fs_err::File;
use log::info;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io;
use std::ops::Range;
use std::path::Path;

const DELIMITER: u8 = b';';
const SIZE: (u32, u32) = (960, 640);

/// The error type for writing reports.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("IO error")]
    Io(#[from] io::Error),
    #[error("CSV error")]
    Csv(#[from] csv::Error),
    #[error("failed to draw chart: {0}")]
    Plot(String),
    #[error("nothing to plot")]
    Empty,
}

fn plot_err<E: Display>(e: E) -> ReportError {
    ReportError::Plot(e.to_string())
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub query: String,
    pub sparql_mean_s: f64,
    pub native_mean_s: f64,
    pub difference_s: f64,
    pub difference_pct: f64,
    pub sparql_bytes: usize,
    pub native_bytes: usize,
}

impl From<&AggregateResult> for SummaryRow {
    fn from(r: &AggregateResult) -> Self {
        SummaryRow {
            query: r.query.clone(),
            sparql_mean_s: r.sparql.trimmed_mean,
            native_mean_s: r.native.trimmed_mean,
            difference_s: r.difference,
            difference_pct: r.difference_pct,
            sparql_bytes: r.sparql.response_bytes,
            native_bytes: r.native.response_bytes,
        }
    }
}

/// Write one [`SummaryRow`] per result.
pub fn write_summary_csv(path: &Path, results: &[AggregateResult]) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new().delimiter(DELIMITER).from_writer(File::create(path)?);
    for result in results {
        writer.serialize(SummaryRow::from(result))?;
    }
    writer.flush()?;
    info!("wrote summary of {} queries to {}", results.len(), path.display());
    Ok(())
}

/// A measurement of `time` seconds for a problem of size `amount`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub amount: f64,
    pub time: f64,
}

/// Labelled line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        Series { label: label.into(), points }
    }
}

/// Write an `amount;time` table.
pub fn write_series_csv(path: &Path, points: &[SeriesPoint]) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new().delimiter(DELIMITER).from_writer(File::create(path)?);
    for p in points {
        writer.serialize(p)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an `amount;time` table, other columns are ignored.
pub fn read_series_csv(path: &Path) -> Result<Vec<SeriesPoint>, ReportError> {
    let mut reader =
        csv::ReaderBuilder::new().delimiter(DELIMITER).trim(csv::Trim::All).from_reader(File::open(path)?);
    let points = reader.deserialize().collect::<Result<Vec<SeriesPoint>, _>>()?;
    Ok(points)
}

/// Title and axis descriptions of a line chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        ChartLabels {
            title: "Schema Mapping Time".to_owned(),
            x_label: "Number of Classes".to_owned(),
            y_label: "Execution Time (in s)".to_owned(),
        }
    }
}

// never empty, so that plotters can lay out a single point or a flat line
fn padded(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let pad = if max > min { (max - min) * 0.05 } else { min.abs().max(1.0) * 0.5 };
    Some(min - pad..max + pad)
}

/// Line chart of several series, one colour and legend entry each.
pub fn plot_series(path: &Path, labels: &ChartLabels, series: &[Series]) -> Result<(), ReportError> {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let x_range = padded(points().map(|p| p.amount)).ok_or(ReportError::Empty)?;
    let y_range = padded(points().map(|p| p.time)).ok_or(ReportError::Empty)?;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;
    chart.configure_mesh().x_desc(&labels.x_label).y_desc(&labels.y_label).draw().map_err(plot_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(s.points.iter().map(|p| (p.amount, p.time)), color.stroke_width(2)))
            .map_err(plot_err)?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    info!("wrote chart '{}' to {}", labels.title, path.display());
    Ok(())
}

/// Box plot of the raw latencies of both endpoints for one query pair.
pub fn plot_boxplot(path: &Path, result: &AggregateResult) -> Result<(), ReportError> {
    if result.sparql.latencies.is_empty() || result.native.latencies.is_empty() {
        return Err(ReportError::Empty);
    }
    let names = ["SPARQL".to_owned(), "HGQL".to_owned()];
    let quartiles = [Quartiles::new(&result.sparql.latencies), Quartiles::new(&result.native.latencies)];
    let max = result.sparql.latencies.iter().chain(&result.native.latencies).copied().fold(0.0, f64::max) as f32;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Query {}", result.query), ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(names[..].into_segmented(), 0.0f32..(max * 1.1).max(f32::EPSILON))
        .map_err(plot_err)?;
    chart.configure_mesh().y_desc("Execution Time (in s)").draw().map_err(plot_err)?;
    chart
        .draw_series(
            names.iter().zip(&quartiles).map(|(name, q)| Boxplot::new_vertical(SegmentValue::CenterOf(name), q)),
        )
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}

/// Trimmed mean latency of each endpoint against the 1-based position of the query in `results`,
/// SPARQL first.
pub fn depth_series(results: &[AggregateResult]) -> [Series; 2] {
    let line = |mean: fn(&AggregateResult) -> f64| {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| SeriesPoint { amount: (i + 1) as f64, time: mean(r) })
            .collect::<Vec<_>>()
    };
    [
        Series::new("SPARQL", line(|r| r.sparql.trimmed_mean)),
        Series::new("HGQL", line(|r| r.native.trimmed_mean)),
    ]
}

/// Line chart of [`depth_series`].
pub fn plot_depth_comparison(path: &Path, results: &[AggregateResult]) -> Result<(), ReportError> {
    let labels = ChartLabels {
        title: "Query Execution Time".to_owned(),
        x_label: "Nesting Depth".to_owned(),
        y_label: "Execution Time (in s)".to_owned(),
    };
    plot_series(path, &labels, &depth_series(results))
}
