//! Daily aggregation.
//!
//! Intraday rows collapse into one row per (key, UTC day). Each known field
//! has a fixed aggregation; columns outside that set are dropped, which is
//! also what retires free-text columns like `brand_name` from the frame.

use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::{is_numeric, DAY, SYMBOL};

/// Field aggregations, applied to whichever of these columns are present.
const AGG_FIELDS: [&str; 7] = [
    "open",
    "close",
    "high",
    "low",
    "volume",
    "daily_return",
    "volatility",
];

fn agg_expr(field: &str) -> Expr {
    let e = col(field);
    match field {
        "high" => e.max(),
        "low" => e.min(),
        "volume" => e.sum(),
        // open, close, daily_return, volatility
        _ => e.mean(),
    }
}

/// Collapse a per-row frame into one row per (key, UTC day).
///
/// `ts_col` must hold UTC datetimes and `key_col` the grouping key; rows with
/// a null in either are excluded and counted in the returned total. The key
/// column is renamed to `symbol` in the output, and the day lands in a `day`
/// column with dtype `Date`.
pub fn aggregate_daily(
    df: &DataFrame,
    ts_col: &str,
    key_col: &str,
) -> Result<(DataFrame, usize), PipelineError> {
    let schema = df.schema();
    if !schema.contains(ts_col) {
        return Err(PipelineError::SchemaMismatch(format!(
            "timestamp column '{ts_col}' is missing before aggregation"
        )));
    }
    if !schema.contains(key_col) {
        return Err(PipelineError::SchemaMismatch(format!(
            "key column '{key_col}' is missing before aggregation"
        )));
    }

    let keyed = df
        .clone()
        .lazy()
        .filter(col(key_col).is_not_null().and(col(ts_col).is_not_null()))
        .with_column(col(ts_col).cast(DataType::Date).alias(DAY))
        .collect()?;
    let dropped = df.height() - keyed.height();

    let aggs: Vec<Expr> = AGG_FIELDS
        .into_iter()
        .filter(|field| schema.get(field).is_some_and(is_numeric))
        .map(agg_expr)
        .collect();

    let mut out = keyed
        .lazy()
        .group_by_stable([col(key_col), col(DAY)])
        .agg(aggs)
        .collect()?;
    if key_col != SYMBOL {
        out.rename(key_col, SYMBOL.into())?;
    }
    Ok((out, dropped))
}
