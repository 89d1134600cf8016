//! Rendering of a finished clustering run

use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;

use crate::cluster::{Cluster, Dbscan, Result};

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One block per cluster: counts, corners, center and member points
    Text,
    /// Run parameters, clusters and noise indices as JSON
    Json,
    /// Every input point with its cluster id (-1 for noise)
    Csv,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    epsilon: f64,
    min_points: usize,
    count_points: usize,
    clusters: &'a [Cluster],
    noise: Vec<usize>,
}

/// Writes the clusters of `engine` to `out` in the given format
pub fn write_report<W: Write>(out: &mut W, engine: &Dbscan, format: Format) -> Result<()> {
    match format {
        Format::Text => write_text(out, engine.clusters()),
        Format::Json => write_json(out, engine),
        Format::Csv => write_labels_csv(out, engine),
    }
}

fn write_text<W: Write>(out: &mut W, clusters: &[Cluster]) -> Result<()> {
    for cluster in clusters {
        writeln!(out, "Cluster:")?;
        writeln!(out, "Count of points: {}", cluster.count_points)?;
        writeln!(
            out,
            "Upper left corner: ({:.6}, {:.6})",
            cluster.upper_left.latitude, cluster.upper_left.longitude
        )?;
        writeln!(
            out,
            "Lower right corner: ({:.6}, {:.6})",
            cluster.lower_right.latitude, cluster.lower_right.longitude
        )?;
        writeln!(
            out,
            "Center: ({:.6}, {:.6})",
            cluster.center.latitude, cluster.center.longitude
        )?;
        writeln!(out, "Points:")?;
        for point in &cluster.points {
            writeln!(out, "({:.6}, {:.6})", point.latitude, point.longitude)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_json<W: Write>(out: &mut W, engine: &Dbscan) -> Result<()> {
    let report = JsonReport {
        epsilon: engine.epsilon(),
        min_points: engine.min_points(),
        count_points: engine.points().len(),
        clusters: engine.clusters(),
        noise: engine.noise(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Writes `latitude,longitude,cluster` for every input point, in input order
fn write_labels_csv<W: Write>(out: &mut W, engine: &Dbscan) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(["latitude", "longitude", "cluster"])?;

    for (i, point) in engine.points().iter().enumerate() {
        writer.write_record(&[
            point.latitude.to_string(),
            point.longitude.to_string(),
            engine.status(i).label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
