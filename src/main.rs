//! DBSCAN geo point clustering tool
//!
//! Reads geographic points from a CSV file, groups points that are chained
//! together within an epsilon radius, and reports every cluster with its
//! bounding box and center.

use clap::Parser;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cluster;
mod report;


use cluster::{Dbscan, Error, Point, PointList, Result};
use report::Format;

#[derive(Parser)]
#[command(name = "geo_dbscan")]
#[command(about = "DBSCAN geo point clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with latitude,longitude columns (default: built-in sample)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file for the report (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Epsilon: max distance between chained points, in degrees
    #[arg(short, long, default_value_t = 10.01, allow_negative_numbers = true)]
    eps: f64,

    /// Minimum number of points for a group to be kept as a cluster
    #[arg(short = 'm', long, default_value_t = 1)]
    min_points: usize,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `--debug`
fn init_tracing(debug: bool) {
    let default = if debug {
        "geo_dbscan=debug"
    } else {
        "geo_dbscan=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let points = match &args.input {
        Some(path) => {
            let points = read_points(path)?;
            info!(count = points.len(), path = %path.display(), "read points");
            points
        }
        None => {
            info!("no input given, using built-in sample points");
            sample_points()
        }
    };

    debug!(
        eps = args.eps,
        min_points = args.min_points,
        "running clustering"
    );
    let mut engine = Dbscan::new(points, args.eps, args.min_points)?;
    engine.get_clusters();
    debug!(
        clusters = engine.clusters().len(),
        noise = engine.noise().len(),
        "clustering done"
    );

    match &args.output {
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            report::write_report(&mut out, &engine, args.format)?;
            out.flush()?;
        }
        Some(path) => {
            let mut out = File::create(path)?;
            report::write_report(&mut out, &engine, args.format)?;
            out.flush()?;
            info!(path = %path.display(), "report written");
        }
    }

    Ok(())
}

/// Reads points from a CSV file
fn read_points(filename: &Path) -> Result<PointList> {
    let file = File::open(filename)?;
    read_points_from(file)
}

/// Reads points from CSV data
///
/// Expected format: `latitude,longitude` (header row is optional, extra
/// columns are ignored). A data row that is too short or does not parse is
/// an error; nothing is clustered from a partially valid file.
fn read_points_from<R: Read>(reader: R) -> Result<PointList> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = PointList::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(idx as u64 + 1, |pos| pos.line());

        // First row is a header when its first field is not a number
        if idx == 0 && record.get(0).is_some_and(|f| f.parse::<f64>().is_err()) {
            continue;
        }

        if record.len() < 2 {
            return Err(Error::invalid_record(
                line,
                format!("expected 2 columns, found {}", record.len()),
            ));
        }

        let lat = parse_coordinate(&record[0], "latitude", line)?;
        let lon = parse_coordinate(&record[1], "longitude", line)?;

        points.push(Point::new(lat, lon));
    }

    Ok(points)
}

fn parse_coordinate(field: &str, name: &str, line: u64) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|e| Error::invalid_record(line, format!("{} {:?}: {}", name, field, e)))
}

/// Fixed demo set clustered when no input file is given
fn sample_points() -> PointList {
    vec![
        Point::new(40.7128, -74.0060),
        Point::new(40.7128, -74.0060),
        Point::new(40.9128, -74.0060),
        Point::new(43.9128, -74.0060),
        Point::new(44.9128, -75.0060),
        Point::new(54.9129, -75.0060),
        Point::new(64.9128, -75.0060),
    ]
}
