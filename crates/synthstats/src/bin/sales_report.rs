use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use synthstats_core::pipelines::{run_sales_pipeline, Input, SalesRun};
use synthstats_core::present::monthly_sales_chart;
use synthstats_core::schema::{Region, DEFAULT_SEED};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monthly sales by region from a synthetic sales table", long_about = None)]
struct Cli {
    /// Seed for the random sales table
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Number of generated rows (defaults to 500)
    #[arg(long)]
    rows: Option<usize>,
    /// Read sales rows from a CSV file instead of generating them
    #[arg(long, conflicts_with_all = ["seed", "rows"])]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let input = match cli.input {
        Some(path) => Input::Csv(path),
        None => Input::Generated {
            seed: cli.seed,
            rows: cli.rows,
        },
    };

    info!(?input, "running sales pipeline");
    let report = run_sales_pipeline(&SalesRun { input }).context("sales pipeline failed")?;

    let chart = monthly_sales_chart(&report.monthly, Region::ALL)
        .context("failed to build monthly sales chart")?;
    println!("{chart}");

    Ok(())
}
