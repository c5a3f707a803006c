use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::info;

use crate::aggregate::{self, ActivityPivot, AggregateTable};
use crate::error::Result;
use crate::loader;
use crate::preprocess;
use crate::schema::{DEFAULT_SEED, TOP_USERS};
use crate::source::{ActivitySource, ActivitySourceConfig, SalesSource, SalesSourceConfig};
use crate::validation;

/// Where a pipeline takes its raw table from.
#[derive(Debug, Clone)]
pub enum Input {
    /// Seeded random table; `rows` overrides the default row count.
    Generated { seed: u64, rows: Option<usize> },
    Csv(PathBuf),
}

impl Default for Input {
    fn default() -> Self {
        Input::Generated {
            seed: DEFAULT_SEED,
            rows: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SalesRun {
    pub input: Input,
}

#[derive(Debug, Clone)]
pub struct SalesReport {
    /// Preprocessed source table.
    pub table: DataFrame,
    pub monthly: AggregateTable,
}

#[derive(Debug, Clone)]
pub struct ActivityRun {
    pub input: Input,
    pub top_n: usize,
}

impl Default for ActivityRun {
    fn default() -> Self {
        Self {
            input: Input::default(),
            top_n: TOP_USERS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityReport {
    pub table: DataFrame,
    pub daily: ActivityPivot,
    pub weekly: AggregateTable,
    pub top_users: AggregateTable,
}

fn load_sales(input: &Input) -> Result<DataFrame> {
    let df = match input {
        Input::Generated { seed, rows } => {
            let defaults = SalesSourceConfig::default();
            SalesSource::new(SalesSourceConfig {
                seed: *seed,
                rows: rows.unwrap_or(defaults.rows),
                ..defaults
            })
            .generate()?
        }
        Input::Csv(path) => loader::load_sales_csv_path(path)?,
    };
    validation::validate_sales_frame(&df)?;
    Ok(df)
}

fn load_activity(input: &Input) -> Result<DataFrame> {
    let df = match input {
        Input::Generated { seed, rows } => {
            let defaults = ActivitySourceConfig::default();
            ActivitySource::new(ActivitySourceConfig {
                seed: *seed,
                rows: rows.unwrap_or(defaults.rows),
                ..defaults
            })
            .generate()?
        }
        Input::Csv(path) => loader::load_activity_csv_path(path)?,
    };
    validation::validate_activity_frame(&df)?;
    Ok(df)
}

/// Source, month/quarter derivation, then the monthly-regional sum.
pub fn run_sales_pipeline(run: &SalesRun) -> Result<SalesReport> {
    let raw = load_sales(&run.input)?;
    let table = preprocess::preprocess_sales(&raw)?;
    let monthly = aggregate::monthly_regional_sum(&table)?;

    info!(
        rows = table.height(),
        groups = monthly.height(),
        "sales pipeline finished"
    );

    Ok(SalesReport { table, monthly })
}

/// Source, day/weekday derivation, then the daily pivot, weekly sums and top-user ranking.
pub fn run_activity_pipeline(run: &ActivityRun) -> Result<ActivityReport> {
    let raw = load_activity(&run.input)?;
    let table = preprocess::preprocess_activity(&raw)?;
    let daily = aggregate::daily_activity_count(&table)?;
    let weekly = aggregate::weekly_engagement_sum(&table)?;
    let top_users = aggregate::top_users(&table, run.top_n)?;

    info!(
        rows = table.height(),
        days = daily.height(),
        weekly_groups = weekly.height(),
        top_users = top_users.height(),
        "activity pipeline finished"
    );

    Ok(ActivityReport {
        table,
        daily,
        weekly,
        top_users,
    })
}
