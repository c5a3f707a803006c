use polars::prelude::*;
use synthstats_core::preprocess::{
    normalize_dates, preprocess_activity, preprocess_sales, PreprocessError,
};
use synthstats_core::source::SalesSource;

fn sales_with_dates(dates: &[&str]) -> DataFrame {
    let len = dates.len();
    df!(
        "date" => dates,
        "product" => vec!["Product A"; len],
        "region" => vec!["North"; len],
        "sales" => vec![10i64; len],
        "revenue" => vec![100.0f64; len],
    )
    .unwrap()
}

#[test]
fn sales_gain_month_and_quarter() -> anyhow::Result<()> {
    let df = sales_with_dates(&["2022-01-15", "2022-04-01", "2022-05-31", "2022-12-31"]);
    let out = preprocess_sales(&df)?;

    assert_eq!(out.column("date")?.dtype(), &DataType::Date);
    let months: Vec<Option<i32>> = out.column("month")?.i32()?.into_iter().collect();
    assert_eq!(months, [Some(1), Some(4), Some(5), Some(12)]);
    let quarters: Vec<Option<i32>> = out.column("quarter")?.i32()?.into_iter().collect();
    assert_eq!(quarters, [Some(1), Some(2), Some(2), Some(4)]);

    Ok(())
}

#[test]
fn activity_gains_day_and_english_weekday() -> anyhow::Result<()> {
    let df = df!(
        "date" => ["2022-01-03", "2022-01-08", "2022-01-09", "2022-01-31"],
        "user" => ["User_A", "User_B", "User_C", "User_A"],
        "activity" => ["Post", "Like", "Share", "Comment"],
        "likes" => [1i64, 2, 3, 4],
        "comments" => [0i64, 1, 2, 3],
    )?;
    let out = preprocess_activity(&df)?;

    let days: Vec<Option<i32>> = out.column("day")?.i32()?.into_iter().collect();
    assert_eq!(days, [Some(3), Some(8), Some(9), Some(31)]);
    let weekdays: Vec<Option<&str>> = out.column("weekday")?.str()?.into_iter().collect();
    assert_eq!(
        weekdays,
        [Some("Monday"), Some("Saturday"), Some("Sunday"), Some("Monday")]
    );

    Ok(())
}

#[test]
fn generated_dates_pass_through_unchanged() -> anyhow::Result<()> {
    let df = SalesSource::with_seed(3).generate()?;
    let out = normalize_dates(&df)?;
    assert!(df.equals(&out));
    Ok(())
}

#[test]
fn datetime_column_is_truncated_to_date() -> anyhow::Result<()> {
    // 2022-01-03 18:30:00 UTC in microseconds
    let micros = Series::new("date".into(), [1_641_234_600_000_000i64])
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    let df = DataFrame::new(vec![micros.into()])?;

    let out = normalize_dates(&df)?;
    let rendered = out.column("date")?.cast(&DataType::String)?;
    assert_eq!(rendered.str()?.get(0), Some("2022-01-03"));
    Ok(())
}

#[test]
fn malformed_date_is_reported_with_row() {
    let df = sales_with_dates(&["2022-01-15", "2022-13-01", "2022-02-01"]);
    let err = preprocess_sales(&df).unwrap_err();

    match err {
        PreprocessError::MalformedDate { row, value } => {
            assert_eq!(row, 1);
            assert_eq!(value, "2022-13-01");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn null_date_is_malformed() {
    let df = df!(
        "date" => [Some("2022-01-15"), None],
        "user" => ["User_A", "User_B"],
        "activity" => ["Post", "Like"],
        "likes" => [1i64, 2],
        "comments" => [0i64, 1],
    )
    .unwrap();

    let err = preprocess_activity(&df).unwrap_err();
    assert!(matches!(err, PreprocessError::MalformedDate { row: 1, .. }));
}

#[test]
fn timestamps_with_offsets_or_minutes_normalize_to_their_day() -> anyhow::Result<()> {
    let raw = [
        "2022-01-03T10:00:00Z",
        "2022-01-03T10:00:00+00:00",
        "2022-01-03 10:00",
        "2022-01-03T10:00",
    ];
    let df = df!("date" => raw)?;
    let out = normalize_dates(&df)?;

    let expected = chrono::NaiveDate::from_ymd_opt(2022, 1, 3);
    let dates: Vec<_> = out.column("date")?.date()?.as_date_iter().collect();
    assert_eq!(dates, vec![expected; raw.len()]);
    Ok(())
}

#[test]
fn compact_integer_dates_are_read_as_year_month_day() -> anyhow::Result<()> {
    let df = df!("date" => [20220103i64, 20220228])?;
    let out = normalize_dates(&df)?;

    let dates: Vec<_> = out.column("date")?.date()?.as_date_iter().collect();
    assert_eq!(
        dates,
        [
            chrono::NaiveDate::from_ymd_opt(2022, 1, 3),
            chrono::NaiveDate::from_ymd_opt(2022, 2, 28),
        ]
    );
    Ok(())
}

#[test]
fn integers_that_are_not_calendar_days_are_malformed() {
    let df = df!("date" => [20220103i64, 20221301]).unwrap();
    let err = normalize_dates(&df).unwrap_err();
    assert!(matches!(
        err,
        PreprocessError::MalformedDate { row: 1, ref value } if value == "20221301"
    ));
}
