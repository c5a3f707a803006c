use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use synthstats_core::pipelines::{run_activity_pipeline, ActivityRun, Input};
use synthstats_core::present::{
    daily_activity_chart, frame_table, top_users_chart, weekly_engagement_chart,
};
use synthstats_core::schema::{Activity, DEFAULT_SEED, TOP_USERS};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Social activity trends and engagement rankings", long_about = None)]
struct Cli {
    /// Seed for the random activity table
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Number of generated rows (defaults to 1000)
    #[arg(long)]
    rows: Option<usize>,
    /// Read activity rows from a CSV file instead of generating them
    #[arg(long, conflicts_with_all = ["seed", "rows"])]
    input: Option<PathBuf>,
    /// How many users to keep in the ranking
    #[arg(long, default_value_t = TOP_USERS)]
    top: usize,
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

    info!(?input, top = cli.top, "running activity pipeline");
    let report = run_activity_pipeline(&ActivityRun {
        input,
        top_n: cli.top,
    })
    .context("activity pipeline failed")?;

    println!(
        "{}",
        daily_activity_chart(&report.daily, Activity::ALL)
            .context("failed to build daily activity chart")?
    );
    println!(
        "{}",
        weekly_engagement_chart(&report.weekly)
            .context("failed to build weekly engagement chart")?
    );
    println!(
        "{}",
        top_users_chart(&report.top_users).context("failed to build top users chart")?
    );

    println!("Most Active Users:");
    println!(
        "{}",
        frame_table(report.top_users.frame()).context("failed to render top users")?
    );

    Ok(())
}
