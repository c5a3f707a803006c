use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::schema::{Activity, Field, Product, Region, User};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV row {line} invalid: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl LoadError {
    fn from_csv(source: csv::Error) -> Self {
        let line = source.position().map(|pos| pos.line()).unwrap_or(0);
        LoadError::Csv { line, source }
    }
}

/// Sales row as it appears in a CSV export; the date stays raw text for the preprocessor.
#[derive(Debug, Deserialize)]
struct SalesCsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Product", alias = "product")]
    product: Product,
    #[serde(rename = "Region", alias = "region")]
    region: Region,
    #[serde(rename = "Sales", alias = "sales")]
    sales: i64,
    #[serde(rename = "Revenue", alias = "revenue")]
    revenue: f64,
}

#[derive(Debug, Deserialize)]
struct ActivityCsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "User", alias = "user")]
    user: User,
    #[serde(rename = "Activity", alias = "activity")]
    activity: Activity,
    #[serde(rename = "Likes", alias = "likes")]
    likes: i64,
    #[serde(rename = "Comments", alias = "comments")]
    comments: i64,
}

fn read_rows<T, R>(reader: R) -> Result<Vec<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize()
        .map(|row| row.map_err(LoadError::from_csv))
        .collect()
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_sales_csv<R: Read>(reader: R) -> Result<DataFrame, LoadError> {
    let rows: Vec<SalesCsvRow> = read_rows(reader)?;

    let df = DataFrame::new(vec![
        Series::new(
            Field::Date.name().into(),
            rows.iter().map(|row| row.date.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Product.name().into(),
            rows.iter().map(|row| row.product.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Region.name().into(),
            rows.iter().map(|row| row.region.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Sales.name().into(),
            rows.iter().map(|row| row.sales).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Revenue.name().into(),
            rows.iter().map(|row| row.revenue).collect::<Vec<_>>(),
        )
        .into(),
    ])?;

    debug!(rows = df.height(), "loaded sales CSV");
    Ok(df)
}

pub fn load_activity_csv<R: Read>(reader: R) -> Result<DataFrame, LoadError> {
    let rows: Vec<ActivityCsvRow> = read_rows(reader)?;

    let df = DataFrame::new(vec![
        Series::new(
            Field::Date.name().into(),
            rows.iter().map(|row| row.date.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::User.name().into(),
            rows.iter().map(|row| row.user.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Activity.name().into(),
            rows.iter().map(|row| row.activity.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Likes.name().into(),
            rows.iter().map(|row| row.likes).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            Field::Comments.name().into(),
            rows.iter().map(|row| row.comments).collect::<Vec<_>>(),
        )
        .into(),
    ])?;

    debug!(rows = df.height(), "loaded activity CSV");
    Ok(df)
}

pub fn load_sales_csv_path(path: &Path) -> Result<DataFrame, LoadError> {
    load_sales_csv(open(path)?)
}

pub fn load_activity_csv_path(path: &Path) -> Result<DataFrame, LoadError> {
    load_activity_csv(open(path)?)
}
