//! Cross-source merge.
//!
//! Aggregated frames stack in source order and collapse on (symbol, day).
//! When several sources claim the same key, the earliest-listed source wins;
//! columns one source carries and another lacks are null-filled.

use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::{DAY, SYMBOL};

/// Merge daily aggregates from several sources into one frame.
///
/// Every input must carry `symbol` and `day` columns. Inputs are stacked in
/// the order given and deduplicated on (symbol, day) keeping the first row,
/// so source priority is the slice order.
pub fn merge_aggregates(frames: &[DataFrame]) -> Result<DataFrame, PipelineError> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }
    for (idx, frame) in frames.iter().enumerate() {
        let schema = frame.schema();
        for required in [SYMBOL, DAY] {
            if !schema.contains(required) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "merge input #{idx} lacks required column '{required}'"
                )));
            }
        }
    }

    let lfs: Vec<LazyFrame> = frames.iter().map(|df| df.clone().lazy()).collect();
    let stacked = concat_lf_diagonal(
        lfs,
        UnionArgs {
            parallel: false,
            rechunk: true,
            ..Default::default()
        },
    )?;
    let merged = stacked
        .unique_stable(
            Some(vec![SYMBOL.into(), DAY.into()]),
            UniqueKeepStrategy::First,
        )
        .collect()?;
    Ok(merged)
}
