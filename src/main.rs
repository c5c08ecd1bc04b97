use clap::Parser;
use order_totals::join::JoinedRow;
use order_totals::{Config, NamedDocument, RunOutcome};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Add up purchase-order PDFs per product and write the box-count workbook.
#[derive(Debug, Parser)]
#[command(name = "order-totals")]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF listing units per box for each product code
    reference: PathBuf,

    /// Purchase-order PDFs
    #[arg(required = true)]
    orders: Vec<PathBuf>,

    /// Where to write the workbook (defaults to the configured file name)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// A joined row as shown to the user, with the box count computed for display.
#[derive(Serialize)]
struct DisplayRow<'a> {
    #[serde(flatten)]
    row: &'a JoinedRow,
    box_count: Option<f64>,
}

fn read_document(path: &Path) -> Result<NamedDocument, Box<dyn std::error::Error>> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(NamedDocument::new(name, bytes))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let reference = read_document(&args.reference)?;
    let orders = args
        .orders
        .iter()
        .map(|p| read_document(p))
        .collect::<Result<Vec<_>, _>>()?;
    info!(orders = orders.len(), reference = %reference.name, "Documents loaded");

    let report = match order_totals::run(&orders, &reference, &cfg)? {
        RunOutcome::Report(report) => report,
        RunOutcome::NothingFound => {
            warn!("No products found in the uploaded order documents; nothing written");
            println!("\n⚠ No products found in the order documents.\n");
            return Ok(());
        }
    };

    let display: Vec<DisplayRow> = report
        .rows
        .iter()
        .map(|row| DisplayRow {
            row,
            box_count: row.box_count(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&display)?);

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&cfg.report.file_name));
    fs::write(&out, &report.workbook)?;
    info!(path = %out.display(), rows = report.rows.len(), "Workbook saved");

    Ok(())
}
