// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{Parser, ValueEnum};
use geo::Polygon;
use polygon_iou::{Error, Evaluation, MatchOptions, ResultRow, evaluate, polygon_from_rings};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Match predicted polygons to ground-truth polygons and report the IoU of
/// every ground truth.
///
/// Both inputs are JSON arrays of polygons. Each polygon is an array of rings
/// (exterior first, then holes) and each ring an array of `[x, y]` points.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ground-truth polygons (JSON)
    ground_truth: PathBuf,

    /// Predicted polygons (JSON)
    predictions: PathBuf,

    /// Number of worker threads, defaults to one per core
    #[clap(long, env = "POLYGON_IOU_THREADS")]
    threads: Option<usize>,

    /// Run overlap discovery and scoring on the calling thread only
    #[clap(long)]
    sequential: bool,

    /// Format of the report printed to stdout
    #[clap(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Also write the result table to a .json or .arrow file
    #[clap(long, short)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, PartialEq, Clone, Copy, Debug)]
enum Format {
    /// One JSON object per ground truth
    Json,
    /// Aligned text table
    Table,
    /// Match counts and mean IoU
    Summary,
}

fn read_polygons(path: &Path) -> Result<Vec<Polygon<f64>>, Error> {
    let file = File::open(path)?;
    let polygons: Vec<Vec<Vec<[f64; 2]>>> = serde_json::from_reader(BufReader::new(file))?;
    log::info!("Loaded {} polygons from {:?}", polygons.len(), path);
    Ok(polygons
        .iter()
        .map(|rings| polygon_from_rings(rings))
        .collect())
}

fn print_table(rows: &[ResultRow]) {
    println!("{:>10}  {:>13}  {:>8}", "truth_id", "prediction_id", "IoU");
    for row in rows {
        let prediction = row
            .prediction_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_owned());
        println!("{:>10}  {:>13}  {:>8.6}", row.truth_id, prediction, row.iou);
    }
}

fn write_output(rows: &[ResultRow], output: &Path) -> Result<(), Error> {
    let format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match format {
        Some(ext) if ext == "json" => {
            let mut file = File::create(output)?;
            file.write_all(serde_json::to_string_pretty(rows)?.as_bytes())?;
        }
        Some(ext) if ext == "arrow" => {
            #[cfg(feature = "polars")]
            {
                use polars::{io::SerWriter as _, prelude::IpcWriter};

                let mut df = polygon_iou::results_dataframe(rows)?;
                IpcWriter::new(File::create(output)?).finish(&mut df)?;
            }
            #[cfg(not(feature = "polars"))]
            {
                return Err(Error::FeatureNotEnabled("polars".to_owned()));
            }
        }
        _ => {
            return Err(Error::InvalidParameters(format!(
                "Unsupported output format: {:?}",
                format
            )));
        }
    }
    log::info!("Wrote {} rows to {:?}", rows.len(), output);
    Ok(())
}

fn report(evaluation: &Evaluation, format: Format) -> Result<(), Error> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&evaluation.rows)?),
        Format::Table => print_table(&evaluation.rows),
        Format::Summary => println!("{}", evaluation),
    }
    Ok(())
}

#[cfg(feature = "profiling")]
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        log::warn!("Tracing subscriber already installed: {}", err);
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "profiling")]
    init_tracing();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::InvalidParameters(format!("Thread pool: {}", e)))?;
    }

    let ground_truth = read_polygons(&args.ground_truth)?;
    let predictions = read_polygons(&args.predictions)?;

    let options = MatchOptions::default().with_parallel(!args.sequential);
    #[cfg(feature = "profiling")]
    let _span = polygon_iou::instrument::info_span!(
        "polygon-iou",
        ground_truths = ground_truth.len(),
        predictions = predictions.len()
    )
    .entered();
    let evaluation = evaluate(&ground_truth, &predictions, &options)?;
    log::info!(
        "Matched {} of {} ground truths",
        evaluation.matched(),
        evaluation.rows.len()
    );

    if let Some(output) = &args.output {
        write_output(&evaluation.rows, output)?;
    }

    report(&evaluation, args.format)
}
