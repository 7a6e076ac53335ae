//! Time window filtering.
//!
//! Every source declares which column holds its record timestamp and which
//! calendar year it contributes. The filter parses that column to a UTC
//! instant and keeps only rows whose UTC calendar year matches the target.
//! Judging the year in UTC is what makes day boundaries line up across
//! sources: a record stamped `2024-12-31T23:30-05:00` belongs to 2025-01-01
//! and must land in the 2025 window no matter which source produced it.
//!
//! Parsing is best-effort at the value level: a cell that cannot be parsed
//! under the source's declared format becomes null and is dropped with a
//! count, never aborting the dataset. A missing column, or a column whose
//! dtype cannot hold a timestamp at all, is a configuration problem and
//! fails hard.

use polars::prelude::*;

use crate::error::PipelineError;

/// Parse `timestamp_column` to a UTC datetime and keep rows in `year`.
///
/// Returns the filtered frame and the number of rows dropped because their
/// timestamp was missing or unparseable. Rows outside the target year are
/// filtered, not counted as drops. The timestamp column keeps its name; its
/// dtype becomes `Datetime(ms, UTC)`.
pub fn filter_year(
    df: &DataFrame,
    timestamp_column: &str,
    year: i32,
    format: Option<&str>,
) -> Result<(DataFrame, usize), PipelineError> {
    let schema = df.schema();
    let dtype = schema
        .get(timestamp_column)
        .ok_or_else(|| PipelineError::Parse {
            column: timestamp_column.to_string(),
            reason: "column not found".to_string(),
        })?;

    let utc = DataType::Datetime(TimeUnit::Milliseconds, Some("UTC".into()));
    let parsed = match dtype {
        DataType::String => col(timestamp_column).str().to_datetime(
            Some(TimeUnit::Milliseconds),
            Some("UTC".into()),
            StrptimeOptions {
                format: format.map(Into::into),
                strict: false,
                exact: true,
                cache: true,
            },
            lit("raise"),
        ),
        DataType::Date => col(timestamp_column).cast(utc),
        // Naive datetimes are taken as UTC wall-clock; zoned ones convert.
        DataType::Datetime(_, None) => col(timestamp_column).cast(utc),
        DataType::Datetime(_, Some(_)) => col(timestamp_column)
            .dt()
            .convert_time_zone("UTC".into())
            .cast(utc),
        other => {
            return Err(PipelineError::Parse {
                column: timestamp_column.to_string(),
                reason: format!("dtype {other} cannot hold a timestamp"),
            })
        }
    };

    let with_instants = df
        .clone()
        .lazy()
        .with_column(parsed.alias(timestamp_column))
        .collect()
        .map_err(|e| PipelineError::Parse {
            column: timestamp_column.to_string(),
            reason: e.to_string(),
        })?;

    let unassigned = with_instants.column(timestamp_column)?.null_count();

    let filtered = with_instants
        .lazy()
        .filter(
            col(timestamp_column)
                .is_not_null()
                .and(col(timestamp_column).dt().year().eq(lit(year))),
        )
        .collect()?;

    Ok((filtered, unassigned))
}
