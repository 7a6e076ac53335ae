//! The per-source transform chain.
//!
//! One function runs every source through the same stages; per-source
//! differences (timestamp column, key column, target year, timestamp format)
//! arrive as data via [`SourceSchema`], never as code paths.

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::report::{null_profile, SourceReport};
use crate::schema::{SourceSchema, BRAND};
use crate::transform::{
    add_derived, aggregate_daily, drop_negative_rows, filter_year, normalize_columns,
    normalize_name, titlecase_column,
};

/// Run one source's raw frame through the full stage chain.
///
/// Stage order: window filter on the declared timestamp column, column name
/// normalization, derived features, row validation, daily aggregation. The
/// returned frame is keyed on (`symbol`, `day`) and ready for the
/// cross-source merge; the report accounts for every row a stage discarded.
///
/// The report's `synthetic` flag is left `false` here; callers that know the
/// frame's provenance set it.
pub fn transform_source(
    name: &str,
    df: DataFrame,
    schema: &SourceSchema,
) -> Result<(DataFrame, SourceReport), PipelineError> {
    let rows_fetched = df.height();

    let (windowed, rows_dropped_unparseable) = filter_year(
        &df,
        &schema.timestamp_column,
        schema.year,
        schema.timestamp_format.as_deref(),
    )?;
    let rows_outside_window = rows_fetched - rows_dropped_unparseable - windowed.height();
    if rows_dropped_unparseable > 0 {
        warn!(
            "{}: dropped {} rows with unusable timestamps",
            name, rows_dropped_unparseable
        );
    }

    let normalized = normalize_columns(&windowed)?;
    let tidy = titlecase_column(&normalized, BRAND)?;
    let null_columns = null_profile(&tidy);
    for nc in &null_columns {
        debug!("{}: column '{}' has {} nulls", name, nc.column, nc.nulls);
    }

    let enriched = add_derived(&tidy)?;
    let (valid, rows_dropped_negative) = drop_negative_rows(&enriched)?;
    if rows_dropped_negative > 0 {
        warn!(
            "{}: dropped {} rows with negative values",
            name, rows_dropped_negative
        );
    }

    let (daily, rows_dropped_unkeyed) = aggregate_daily(
        &valid,
        &normalize_name(&schema.timestamp_column),
        &normalize_name(&schema.symbol_column),
    )?;
    if rows_dropped_unkeyed > 0 {
        warn!(
            "{}: dropped {} rows missing a key or timestamp",
            name, rows_dropped_unkeyed
        );
    }

    info!(
        "{}: {} rows in, {} daily rows out for year {}",
        name,
        rows_fetched,
        daily.height(),
        schema.year
    );

    let report = SourceReport {
        source: name.to_string(),
        synthetic: false,
        rows_fetched,
        rows_dropped_unparseable,
        rows_outside_window,
        rows_dropped_negative,
        rows_dropped_unkeyed,
        rows_aggregated: daily.height(),
        null_columns,
    };
    Ok((daily, report))
}
