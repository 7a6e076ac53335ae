//! Row validation.
//!
//! Prices and volumes are non-negative by definition; a negative value means
//! the source shipped garbage for that row. The validator drops such rows
//! silently and reports how many it dropped. Null cells are not negative and
//! survive; a field missing from the schema entirely is simply not checked.

use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::{is_numeric, PRICE_FIELDS};

/// Drop rows carrying a negative value in any known numeric field.
///
/// Returns the filtered frame and the number of rows dropped.
pub fn drop_negative_rows(df: &DataFrame) -> Result<(DataFrame, usize), PipelineError> {
    let schema = df.schema();

    let mut checks = PRICE_FIELDS
        .into_iter()
        .filter(|field| schema.get(field).is_some_and(is_numeric))
        .map(|field| col(field).gt_eq(lit(0.0)).or(col(field).is_null()));

    let keep = match checks.next() {
        Some(first) => checks.fold(first, |acc, check| acc.and(check)),
        None => return Ok((df.clone(), 0)),
    };

    let kept = df.clone().lazy().filter(keep).collect()?;
    let dropped = df.height() - kept.height();
    Ok((kept, dropped))
}
