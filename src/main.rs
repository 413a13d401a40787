use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::{fs, path::PathBuf, time::Instant};

use compute_sales::{Catalogue, Report, Sales};

/// Computes the total cost of sales from a price catalogue.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the price catalogue JSON file
    catalogue: PathBuf,
    /// Path to the sales record JSON file
    sales: PathBuf,
    /// File to write the results to
    #[arg(short, long, default_value = "SalesResults.txt")]
    output: PathBuf,
    /// Don't write a results file
    #[arg(long)]
    no_file: bool,
    /// Don't print the report to standard output
    #[arg(short, long)]
    quiet: bool,
}

/// Sends log messages to standard error, filtered by `RUST_LOG`.
///
/// Only warnings are shown by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let start = Instant::now();
    let catalogue = Catalogue::from_file(&args.catalogue)
        .with_context(|| format!("loading catalogue {}", args.catalogue.display()))?;
    info!(products = catalogue.len(), "catalogue loaded");
    let sales = Sales::from_file(&args.sales)
        .with_context(|| format!("loading sales {}", args.sales.display()))?;
    let report = Report::compute(&catalogue, &sales);
    info!(
        valid = report.valid_count(),
        invalid = report.invalid_count(),
        "sales processed"
    );
    let output = format!(
        "{report}Elapsed time: {:.6}s\n",
        start.elapsed().as_secs_f64()
    );
    if !args.quiet {
        print!("{output}");
    }
    if !args.no_file {
        fs::write(&args.output, &output)
            .with_context(|| format!("writing results to {}", args.output.display()))?;
    }
    Ok(())
}
