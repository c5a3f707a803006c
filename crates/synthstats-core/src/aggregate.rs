use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::schema::{Activity, Field, TOP_USERS};

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{operation}: cannot aggregate a table with zero rows")]
    EmptyGroup { operation: &'static str },
    #[error("{operation}: group {row} has no {field} value")]
    MissingValue {
        operation: &'static str,
        row: usize,
        field: Field,
    },
    #[error("{operation}: unexpected {field} value '{value}'")]
    UnknownCategory {
        operation: &'static str,
        field: Field,
        value: String,
    },
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    /// Number of source rows in the group; the measure field names the output column.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub field: Field,
    pub reduction: Reduction,
}

impl Measure {
    pub const fn sum(field: Field) -> Self {
        Self {
            field,
            reduction: Reduction::Sum,
        }
    }

    pub const fn count() -> Self {
        Self {
            field: Field::Count,
            reduction: Reduction::Count,
        }
    }

    fn expr(&self) -> Expr {
        let name = self.field.name();
        match self.reduction {
            Reduction::Sum => col(name).sum().alias(name),
            Reduction::Count => len().cast(DataType::Int64).alias(name),
        }
    }
}

/// Grouping keys plus one reduction per output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: &'static str,
    pub keys: &'static [Field],
    pub measures: &'static [Measure],
}

pub const MONTHLY_REGIONAL_SUM: GroupSpec = GroupSpec {
    name: "monthly_regional_sum",
    keys: &[Field::Month, Field::Region],
    measures: &[Measure::sum(Field::Sales), Measure::sum(Field::Revenue)],
};

pub const DAILY_ACTIVITY_COUNT: GroupSpec = GroupSpec {
    name: "daily_activity_count",
    keys: &[Field::Date, Field::Activity],
    measures: &[Measure::count()],
};

pub const WEEKLY_ENGAGEMENT_SUM: GroupSpec = GroupSpec {
    name: "weekly_engagement_sum",
    keys: &[Field::Weekday, Field::User],
    measures: &[Measure::sum(Field::Likes), Measure::sum(Field::Comments)],
};

pub const USER_ENGAGEMENT_SUM: GroupSpec = GroupSpec {
    name: "user_engagement_sum",
    keys: &[Field::User],
    measures: &[Measure::sum(Field::Likes), Measure::sum(Field::Comments)],
};

/// Result of a grouping: one row per distinct key tuple, ascending by key.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    frame: DataFrame,
}

impl AggregateTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Rows whose `field` equals `category`, in aggregate order.
    pub fn slice(&self, field: Field, category: &str) -> Result<DataFrame, PolarsError> {
        self.frame
            .clone()
            .lazy()
            .filter(col(field.name()).eq(lit(category)))
            .collect()
    }

    /// Sum of a numeric column over the whole aggregate.
    pub fn column_total(&self, field: Field) -> Result<f64, PolarsError> {
        let values = self.frame.column(field.name())?.cast(&DataType::Float64)?;
        Ok(values.f64()?.sum().unwrap_or(0.0))
    }
}

fn ensure_rows(df: &DataFrame, operation: &'static str) -> Result<(), AggregateError> {
    if df.height() == 0 {
        return Err(AggregateError::EmptyGroup { operation });
    }
    Ok(())
}

/// Groups `df` by `spec.keys`, applies each measure and orders rows by key.
pub fn aggregate(df: &DataFrame, spec: &GroupSpec) -> Result<AggregateTable, AggregateError> {
    ensure_rows(df, spec.name)?;

    let keys: Vec<Expr> = spec.keys.iter().map(|key| col(key.name())).collect();
    let measures: Vec<Expr> = spec.measures.iter().map(Measure::expr).collect();

    let frame = df
        .clone()
        .lazy()
        .group_by(keys.clone())
        .agg(measures)
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .collect()?;

    debug!(
        operation = spec.name,
        source_rows = df.height(),
        groups = frame.height(),
        "aggregated table"
    );

    Ok(AggregateTable { frame })
}

/// Total sales and revenue per (month, region).
pub fn monthly_regional_sum(df: &DataFrame) -> Result<AggregateTable, AggregateError> {
    aggregate(df, &MONTHLY_REGIONAL_SUM)
}

/// Total likes and comments per (weekday, user).
pub fn weekly_engagement_sum(df: &DataFrame) -> Result<AggregateTable, AggregateError> {
    aggregate(df, &WEEKLY_ENGAGEMENT_SUM)
}

/// The `limit` users with the most likes.
///
/// Groups come out ordered by user name and are then stably sorted by likes,
/// so users with equal likes keep that order.
pub fn top_users(df: &DataFrame, limit: usize) -> Result<AggregateTable, AggregateError> {
    let by_user = aggregate(df, &USER_ENGAGEMENT_SUM)?;
    let limit = IdxSize::try_from(limit).unwrap_or(IdxSize::MAX);

    let frame = by_user
        .frame
        .lazy()
        .sort_by_exprs(
            [col(Field::Likes.name())],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(limit)
        .collect()?;

    Ok(AggregateTable { frame })
}

pub fn top_five_users(df: &DataFrame) -> Result<AggregateTable, AggregateError> {
    top_users(df, TOP_USERS)
}

/// Per-day activity counts, one column per [`Activity`] in declared order.
#[derive(Debug, Clone)]
pub struct ActivityPivot {
    frame: DataFrame,
}

impl ActivityPivot {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn dates(&self) -> Result<Vec<NaiveDate>, PolarsError> {
        let dates = self.frame.column(Field::Date.name())?.date()?;
        Ok(dates.as_date_iter().flatten().collect())
    }

    pub fn counts(&self, activity: Activity) -> Result<Vec<i64>, PolarsError> {
        Ok(self
            .frame
            .column(activity.as_str())?
            .i64()?
            .into_iter()
            .map(|count| count.unwrap_or(0))
            .collect())
    }

    /// Sum of every cell; equals the source row count.
    pub fn total(&self) -> Result<i64, PolarsError> {
        let mut total = 0;
        for activity in Activity::ALL {
            total += self.counts(*activity)?.iter().sum::<i64>();
        }
        Ok(total)
    }
}

/// Counts rows per (date, activity), then spreads activities into columns.
///
/// Dates that occur in `df` become rows (ascending); combinations that never
/// occur are filled with 0.
pub fn daily_activity_count(df: &DataFrame) -> Result<ActivityPivot, AggregateError> {
    let grouped = aggregate(df, &DAILY_ACTIVITY_COUNT)?;
    let frame = grouped.frame();

    let dates: Vec<Option<NaiveDate>> = frame
        .column(Field::Date.name())?
        .date()?
        .as_date_iter()
        .collect();
    let activities = frame.column(Field::Activity.name())?.str()?;
    let counts = frame.column(Field::Count.name())?.i64()?;

    let missing = |row: usize, field: Field| AggregateError::MissingValue {
        operation: DAILY_ACTIVITY_COUNT.name,
        row,
        field,
    };

    let mut sparse: BTreeMap<NaiveDate, BTreeMap<Activity, i64>> = BTreeMap::new();
    for (row, date) in dates.into_iter().enumerate() {
        let date = date.ok_or_else(|| missing(row, Field::Date))?;
        let activity = activities
            .get(row)
            .ok_or_else(|| missing(row, Field::Activity))?;
        let count = counts.get(row).ok_or_else(|| missing(row, Field::Count))?;

        let activity =
            Activity::try_from(activity).map_err(|_| AggregateError::UnknownCategory {
                operation: DAILY_ACTIVITY_COUNT.name,
                field: Field::Activity,
                value: activity.to_string(),
            })?;
        sparse.entry(date).or_default().insert(activity, count);
    }

    let index = DateChunked::from_naive_date(Field::Date.name().into(), sparse.keys().copied());
    let mut columns: Vec<Column> = vec![index.into_series().into()];
    for activity in Activity::ALL {
        let cells: Vec<i64> = sparse
            .values()
            .map(|row| row.get(activity).copied().unwrap_or(0))
            .collect();
        columns.push(Series::new(activity.as_str().into(), cells).into());
    }

    Ok(ActivityPivot {
        frame: DataFrame::new(columns)?,
    })
}
