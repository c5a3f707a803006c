use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::schema::Field;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("row {row}: '{value}' is not a calendar date")]
    MalformedDate { row: usize, value: String },
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Returns a copy of `df` whose `date` column is a polars `Date`.
///
/// `Date` columns are kept, `Datetime` columns are truncated to their day and
/// anything else is rendered as text and parsed row by row. Timestamps with an
/// offset keep the calendar day written in the value. Integers such as
/// `20220103` read as `YYYYMMDD`. The first null or unparseable value aborts
/// with [`PreprocessError::MalformedDate`].
pub fn normalize_dates(df: &DataFrame) -> Result<DataFrame, PreprocessError> {
    let name = Field::Date.name();
    let column = df.column(name)?;

    let normalized: Column = match column.dtype() {
        DataType::Date => column.clone(),
        DataType::Datetime(_, _) => column.cast(&DataType::Date)?,
        DataType::String => parse_date_strings(column.str()?)?.into(),
        _ => {
            let text = column.cast(&DataType::String)?;
            parse_date_strings(text.str()?)?.into()
        }
    };

    if normalized.null_count() > 0 {
        let row = first_null_row(&normalized);
        return Err(PreprocessError::MalformedDate {
            row,
            value: "null".to_string(),
        });
    }

    let mut output = df.clone();
    output.with_column(normalized)?;
    Ok(output)
}

/// Sales preprocessing: normalized `date` plus `month` (1-12) and `quarter` (1-4).
pub fn preprocess_sales(df: &DataFrame) -> Result<DataFrame, PreprocessError> {
    let date = Field::Date.name();
    let output = normalize_dates(df)?
        .lazy()
        .with_columns([
            col(date)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(Field::Month.name()),
            col(date)
                .dt()
                .quarter()
                .cast(DataType::Int32)
                .alias(Field::Quarter.name()),
        ])
        .collect()?;

    debug!(rows = output.height(), "derived month and quarter");
    Ok(output)
}

/// Activity preprocessing: normalized `date` plus `day` of month and English `weekday` name.
pub fn preprocess_activity(df: &DataFrame) -> Result<DataFrame, PreprocessError> {
    let date = Field::Date.name();
    let output = normalize_dates(df)?
        .lazy()
        .with_columns([
            col(date)
                .dt()
                .day()
                .cast(DataType::Int32)
                .alias(Field::Day.name()),
            col(date).dt().strftime("%A").alias(Field::Weekday.name()),
        ])
        .collect()?;

    debug!(rows = output.height(), "derived day and weekday");
    Ok(output)
}

fn parse_date_strings(values: &StringChunked) -> Result<Series, PreprocessError> {
    let mut dates = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        let raw = value.ok_or_else(|| PreprocessError::MalformedDate {
            row,
            value: "null".to_string(),
        })?;
        let date = parse_date(raw).ok_or_else(|| PreprocessError::MalformedDate {
            row,
            value: raw.to_string(),
        })?;
        dates.push(date);
    }

    Ok(DateChunked::from_naive_date(Field::Date.name().into(), dates).into_series())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(trimmed, format)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

fn first_null_row(column: &Column) -> usize {
    let mask = column.is_null();
    let row = mask
        .into_iter()
        .position(|is_null| is_null == Some(true))
        .unwrap_or(0);
    row
}
