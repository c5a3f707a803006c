use std::ops::Range;

use chrono::NaiveDate;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::schema::{
    Activity, Field, Product, Region, User, ACTIVITY_ROWS, DEFAULT_SEED, SALES_ROWS,
};

const SALES_UNITS: Range<i64> = 10..100;
const SALES_REVENUE: Range<f64> = 100.0..1000.0;
const ACTIVITY_LIKES: Range<i64> = 1..100;
const ACTIVITY_COMMENTS: Range<i64> = 1..20;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("date range {start}..={end} contains no days")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Inclusive range of calendar days sampled at daily frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SourceError> {
        if end < start {
            return Err(SourceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("literal calendar date")
}

#[derive(Debug, Clone)]
pub struct SalesSourceConfig {
    pub seed: u64,
    pub rows: usize,
    pub range: DateRange,
}

impl Default for SalesSourceConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            rows: SALES_ROWS,
            range: DateRange {
                start: calendar_date(2022, 1, 1),
                end: calendar_date(2022, 5, 31),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivitySourceConfig {
    pub seed: u64,
    pub rows: usize,
    pub range: DateRange,
}

impl Default for ActivitySourceConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            rows: ACTIVITY_ROWS,
            range: DateRange {
                start: calendar_date(2022, 1, 1),
                end: calendar_date(2022, 1, 31),
            },
        }
    }
}

/// Draws whole columns one after another from a single seeded generator.
struct ColumnSampler {
    rng: StdRng,
    rows: usize,
}

impl ColumnSampler {
    fn new(seed: u64, rows: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            rows,
        }
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> Vec<T> {
        (0..self.rows)
            .map(|_| values[self.rng.random_range(0..values.len())])
            .collect()
    }

    fn dates(&mut self, range: &DateRange) -> Series {
        let drawn = self.pick(&range.days());
        DateChunked::from_naive_date(Field::Date.name().into(), drawn).into_series()
    }

    fn labels<T: Copy>(
        &mut self,
        field: Field,
        values: &[T],
        label: fn(&T) -> &'static str,
    ) -> Series {
        let drawn: Vec<&'static str> = self.pick(values).iter().map(label).collect();
        Series::new(field.name().into(), drawn)
    }

    fn integers(&mut self, field: Field, range: Range<i64>) -> Series {
        let drawn: Vec<i64> = (0..self.rows)
            .map(|_| self.rng.random_range(range.clone()))
            .collect();
        Series::new(field.name().into(), drawn)
    }

    fn reals(&mut self, field: Field, range: Range<f64>) -> Series {
        let drawn: Vec<f64> = (0..self.rows)
            .map(|_| self.rng.random_range(range.clone()))
            .collect();
        Series::new(field.name().into(), drawn)
    }
}

/// Random sales table: date, product, region, sales units and revenue.
#[derive(Debug, Clone)]
pub struct SalesSource {
    config: SalesSourceConfig,
}

impl SalesSource {
    pub fn new(config: SalesSourceConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SalesSourceConfig {
            seed,
            ..SalesSourceConfig::default()
        })
    }

    pub fn generate(&self) -> Result<DataFrame, SourceError> {
        let config = &self.config;
        let mut sampler = ColumnSampler::new(config.seed, config.rows);

        let df = DataFrame::new(vec![
            sampler.dates(&config.range).into(),
            sampler
                .labels(Field::Product, Product::ALL, Product::as_str)
                .into(),
            sampler
                .labels(Field::Region, Region::ALL, Region::as_str)
                .into(),
            sampler.integers(Field::Sales, SALES_UNITS).into(),
            sampler.reals(Field::Revenue, SALES_REVENUE).into(),
        ])?;

        debug!(seed = config.seed, rows = df.height(), "generated sales table");
        Ok(df)
    }
}

/// Random social activity table: date, user, activity kind, likes and comments.
#[derive(Debug, Clone)]
pub struct ActivitySource {
    config: ActivitySourceConfig,
}

impl ActivitySource {
    pub fn new(config: ActivitySourceConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(ActivitySourceConfig {
            seed,
            ..ActivitySourceConfig::default()
        })
    }

    pub fn generate(&self) -> Result<DataFrame, SourceError> {
        let config = &self.config;
        let mut sampler = ColumnSampler::new(config.seed, config.rows);

        let df = DataFrame::new(vec![
            sampler.dates(&config.range).into(),
            sampler.labels(Field::User, User::ALL, User::as_str).into(),
            sampler
                .labels(Field::Activity, Activity::ALL, Activity::as_str)
                .into(),
            sampler.integers(Field::Likes, ACTIVITY_LIKES).into(),
            sampler.integers(Field::Comments, ACTIVITY_COMMENTS).into(),
        ])?;

        debug!(seed = config.seed, rows = df.height(), "generated activity table");
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let start = calendar_date(2022, 2, 1);
        let end = calendar_date(2022, 1, 1);
        assert!(matches!(
            DateRange::new(start, end),
            Err(SourceError::InvalidRange { .. })
        ));
    }

    #[test]
    fn default_ranges_cover_expected_days() {
        assert_eq!(SalesSourceConfig::default().range.days().len(), 151);
        assert_eq!(ActivitySourceConfig::default().range.days().len(), 31);
    }

    #[test]
    fn single_day_range_has_one_day() {
        let day = calendar_date(2022, 3, 14);
        let range = DateRange::new(day, day).unwrap();
        assert_eq!(range.days(), vec![day]);
    }
}
