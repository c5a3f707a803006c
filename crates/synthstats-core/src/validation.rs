// crates/synthstats-core/src/validation.rs

use polars::prelude::*;
use thiserror::Error;

use crate::schema::{Activity, Field, Product, Region, User, ACTIVITY_COLUMNS, SALES_COLUMNS};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("column '{column}' is missing")]
    MissingColumn { column: Field },
    #[error("column '{column}' has type {found}, expected {expected}")]
    WrongType {
        column: Field,
        expected: DataType,
        found: DataType,
    },
    #[error("column '{column}' is null at row {row}")]
    NullValue { column: Field, row: usize },
    #[error("column '{column}' row {row}: {message}")]
    OutOfDomain {
        column: Field,
        row: usize,
        message: String,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Checks a sales table against its schema: columns, dtypes and value domains.
///
/// The `date` column only has to be present; its representation is the
/// preprocessor's concern.
pub fn validate_sales_frame(df: &DataFrame) -> Result<(), ValidationError> {
    require_columns(df, &SALES_COLUMNS)?;
    check_category::<Product>(df, Field::Product)?;
    check_category::<Region>(df, Field::Region)?;
    check_integer_min(df, Field::Sales, 0)?;
    check_real_min(df, Field::Revenue, 0.0)?;
    Ok(())
}

/// Checks an activity table against its schema: columns, dtypes and value domains.
pub fn validate_activity_frame(df: &DataFrame) -> Result<(), ValidationError> {
    require_columns(df, &ACTIVITY_COLUMNS)?;
    check_category::<User>(df, Field::User)?;
    check_category::<Activity>(df, Field::Activity)?;
    check_integer_min(df, Field::Likes, 1)?;
    check_integer_min(df, Field::Comments, 0)?;
    Ok(())
}

fn require_columns(df: &DataFrame, fields: &[Field]) -> Result<(), ValidationError> {
    for field in fields {
        if df.column(field.name()).is_err() {
            return Err(ValidationError::MissingColumn { column: *field });
        }
    }
    Ok(())
}

fn require_type<'a>(
    df: &'a DataFrame,
    field: Field,
    expected: DataType,
) -> Result<&'a Column, ValidationError> {
    let column = df
        .column(field.name())
        .map_err(|_| ValidationError::MissingColumn { column: field })?;
    if column.dtype() != &expected {
        return Err(ValidationError::WrongType {
            column: field,
            expected,
            found: column.dtype().clone(),
        });
    }
    Ok(column)
}

fn check_category<C>(df: &DataFrame, field: Field) -> Result<(), ValidationError>
where
    C: for<'a> TryFrom<&'a str, Error = String>,
{
    let values = require_type(df, field, DataType::String)?.str()?;
    for (row, value) in values.into_iter().enumerate() {
        let value = value.ok_or(ValidationError::NullValue { column: field, row })?;
        C::try_from(value).map_err(|message| ValidationError::OutOfDomain {
            column: field,
            row,
            message,
        })?;
    }
    Ok(())
}

fn check_integer_min(df: &DataFrame, field: Field, min: i64) -> Result<(), ValidationError> {
    let values = require_type(df, field, DataType::Int64)?.i64()?;
    for (row, value) in values.into_iter().enumerate() {
        let value = value.ok_or(ValidationError::NullValue { column: field, row })?;
        if value < min {
            return Err(ValidationError::OutOfDomain {
                column: field,
                row,
                message: format!("{value} is below the minimum of {min}"),
            });
        }
    }
    Ok(())
}

fn check_real_min(df: &DataFrame, field: Field, min: f64) -> Result<(), ValidationError> {
    let values = require_type(df, field, DataType::Float64)?.f64()?;
    for (row, value) in values.into_iter().enumerate() {
        let value = value.ok_or(ValidationError::NullValue { column: field, row })?;
        if !value.is_finite() || value < min {
            return Err(ValidationError::OutOfDomain {
                column: field,
                row,
                message: format!("{value} is not a finite value of at least {min}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_frame(regions: &[&str], sales: &[i64]) -> DataFrame {
        let len = regions.len();
        df!(
            "date" => vec!["2022-01-01"; len],
            "product" => vec!["Product A"; len],
            "region" => regions,
            "sales" => sales,
            "revenue" => vec![100.0f64; len],
        )
        .unwrap()
    }

    #[test]
    fn accepts_well_formed_sales() {
        let df = sales_frame(&["North", "East"], &[10, 20]);
        validate_sales_frame(&df).unwrap();
    }

    #[test]
    fn rejects_unknown_region() {
        let df = sales_frame(&["North", "West"], &[10, 20]);
        let err = validate_sales_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfDomain {
                column: Field::Region,
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_sales() {
        let df = sales_frame(&["North"], &[-3]);
        let err = validate_sales_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfDomain {
                column: Field::Sales,
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_column() {
        let df = sales_frame(&["North"], &[1]).drop("revenue").unwrap();
        let err = validate_sales_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingColumn {
                column: Field::Revenue
            }
        ));
    }

    #[test]
    fn rejects_wrong_numeric_type() {
        let df = df!(
            "date" => ["2022-01-01"],
            "user" => ["User_A"],
            "activity" => ["Post"],
            "likes" => [1.5f64],
            "comments" => [0i64],
        )
        .unwrap();
        let err = validate_activity_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::WrongType {
                column: Field::Likes,
                ..
            }
        ));
    }
}
