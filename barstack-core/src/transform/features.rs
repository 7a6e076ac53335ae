//! Derived per-record features.
//!
//! Three derived columns, each added only when its input columns exist in
//! the (normalized) schema:
//!
//! - `daily_return = (close - open) / open`, null when `open == 0`
//! - `volatility = high - low`
//! - `capital_gains = close - open`
//!
//! The null at `open == 0` is deliberate: a return is undefined there, and
//! null keeps day-level means well-behaved where a float division would
//! inject inf. Runs after normalization and before aggregation, since
//! aggregation reduces `daily_return` and `volatility` per day.

use polars::prelude::*;

use crate::error::PipelineError;

/// Add the derived feature columns whose prerequisites are present.
pub fn add_derived(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let schema = df.schema();
    let present = |name: &str| schema.contains(name);

    let mut derived: Vec<Expr> = Vec::new();

    if ["open", "close", "high", "low"].into_iter().all(|c| present(c)) {
        derived.push(
            when(col("open").neq(lit(0.0)))
                .then((col("close") - col("open")) / col("open"))
                .otherwise(lit(NULL))
                .alias("daily_return"),
        );
        derived.push((col("high") - col("low")).alias("volatility"));
    }

    if present("close") && present("open") {
        derived.push((col("close") - col("open")).alias("capital_gains"));
    }

    if derived.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.clone().lazy().with_columns(derived).collect()?)
}
