use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use polars::prelude::*;

use crate::aggregate::{ActivityPivot, AggregateTable};
use crate::schema::{Activity, Field, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    StackedBar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// A chart described as data: one x tick per row, one series per category.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub x: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    pub fn series(&self, label: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|series| series.label == label)
    }

    /// Terminal rendering: ticks down the left, series across.
    pub fn to_table(&self) -> Table {
        let mut header = vec![Cell::new(&self.x_label)];
        header.extend(self.series.iter().map(|series| Cell::new(&series.label)));
        if self.kind == ChartKind::StackedBar {
            header.push(Cell::new("Total"));
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (idx, tick) in self.x.iter().enumerate() {
            let mut row = vec![Cell::new(tick)];
            let mut stacked = 0.0;
            for series in &self.series {
                let value = series.values.get(idx).copied().flatten();
                stacked += value.unwrap_or(0.0);
                row.push(number_cell(value));
            }
            if self.kind == ChartKind::StackedBar {
                row.push(number_cell(Some(stacked)));
            }
            table.add_row(row);
        }
        table
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} vs {})", self.title, self.y_label, self.x_label)?;
        write!(f, "{}", self.to_table())
    }
}

fn number_cell(value: Option<f64>) -> Cell {
    let text = match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn float_values(df: &DataFrame, field: Field) -> Result<Vec<Option<f64>>, PolarsError> {
    let values = df.column(field.name())?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn text_values(df: &DataFrame, field: Field) -> Result<Vec<String>, PolarsError> {
    let values = df.column(field.name())?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

/// Line chart of total sales per month, one series per region.
pub fn monthly_sales_chart(
    monthly: &AggregateTable,
    regions: &[Region],
) -> Result<Chart, PolarsError> {
    let months: BTreeSet<i32> = monthly
        .frame()
        .column(Field::Month.name())?
        .i32()?
        .into_iter()
        .flatten()
        .collect();

    let mut series = Vec::with_capacity(regions.len());
    for region in regions {
        let slice = monthly.slice(Field::Region, region.as_str())?;
        let month_values = slice.column(Field::Month.name())?.i32()?;
        let sales = float_values(&slice, Field::Sales)?;

        let by_month: BTreeMap<i32, Option<f64>> = month_values
            .into_iter()
            .zip(sales)
            .filter_map(|(month, total)| month.map(|m| (m, total)))
            .collect();

        series.push(ChartSeries {
            label: region.to_string(),
            values: months
                .iter()
                .map(|month| by_month.get(month).copied().flatten())
                .collect(),
        });
    }

    Ok(Chart {
        title: "Monthly Sales by Region".to_string(),
        x_label: "Month".to_string(),
        y_label: "Total Sales".to_string(),
        kind: ChartKind::Line,
        x: months.iter().map(|month| month.to_string()).collect(),
        series,
    })
}

/// Line chart of daily counts, one series per listed activity.
pub fn daily_activity_chart(
    pivot: &ActivityPivot,
    activities: &[Activity],
) -> Result<Chart, PolarsError> {
    let mut series = Vec::with_capacity(activities.len());
    for activity in activities {
        series.push(ChartSeries {
            label: activity.to_string(),
            values: pivot
                .counts(*activity)?
                .into_iter()
                .map(|count| Some(count as f64))
                .collect(),
        });
    }

    Ok(Chart {
        title: "Daily Activity Trends".to_string(),
        x_label: "Date".to_string(),
        y_label: "Count".to_string(),
        kind: ChartKind::Line,
        x: pivot
            .dates()?
            .iter()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect(),
        series,
    })
}

fn engagement_series(table: &AggregateTable) -> Result<Vec<ChartSeries>, PolarsError> {
    Ok(vec![
        ChartSeries {
            label: "Likes".to_string(),
            values: float_values(table.frame(), Field::Likes)?,
        },
        ChartSeries {
            label: "Comments".to_string(),
            values: float_values(table.frame(), Field::Comments)?,
        },
    ])
}

/// Stacked bars of likes and comments for every (weekday, user) group.
pub fn weekly_engagement_chart(weekly: &AggregateTable) -> Result<Chart, PolarsError> {
    let weekdays = text_values(weekly.frame(), Field::Weekday)?;
    let users = text_values(weekly.frame(), Field::User)?;

    Ok(Chart {
        title: "Weekly User Engagement".to_string(),
        x_label: "User".to_string(),
        y_label: "Count".to_string(),
        kind: ChartKind::StackedBar,
        x: users
            .iter()
            .zip(&weekdays)
            .map(|(user, weekday)| format!("{user} ({weekday})"))
            .collect(),
        series: engagement_series(weekly)?,
    })
}

/// Stacked bars of likes and comments for the top-ranked users.
pub fn top_users_chart(top: &AggregateTable) -> Result<Chart, PolarsError> {
    Ok(Chart {
        title: "Most Active Users with Likes and Comments".to_string(),
        x_label: "User".to_string(),
        y_label: "Count".to_string(),
        kind: ChartKind::StackedBar,
        x: text_values(top.frame(), Field::User)?,
        series: engagement_series(top)?,
    })
}

/// Plain dump of a frame, one table row per frame row.
pub fn frame_table(df: &DataFrame) -> Result<Table, PolarsError> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| Cell::new(name.as_str()))
            .collect::<Vec<_>>(),
    );

    for idx in 0..df.height() {
        let mut row = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let cell = match column.get(idx)? {
                AnyValue::Null => Cell::new(""),
                AnyValue::String(text) => Cell::new(text),
                AnyValue::Float64(value) => number_cell(Some(value)),
                AnyValue::Int64(value) => Cell::new(value).set_alignment(CellAlignment::Right),
                other => Cell::new(other.to_string()),
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_bar_adds_total_column() {
        let chart = Chart {
            title: "t".into(),
            x_label: "User".into(),
            y_label: "Count".into(),
            kind: ChartKind::StackedBar,
            x: vec!["User_A".into()],
            series: vec![
                ChartSeries {
                    label: "Likes".into(),
                    values: vec![Some(10.0)],
                },
                ChartSeries {
                    label: "Comments".into(),
                    values: vec![Some(2.5)],
                },
            ],
        };

        let rendered = chart.to_table().to_string();
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("12.50"));
        assert!(rendered.contains("User_A"));
    }

    #[test]
    fn missing_points_render_as_dash() {
        assert_eq!(number_cell(None).content(), "-");
        assert_eq!(number_cell(Some(3.0)).content(), "3");
        assert_eq!(number_cell(Some(3.456)).content(), "3.46");
    }
}
