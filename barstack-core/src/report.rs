//! Per-source run accounting.
//!
//! Every stage that discards rows reports how many it discarded; the counts
//! are collected here so a run can explain where the data went.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Null tally for one column of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

/// What one source contributed to a run, stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    pub synthetic: bool,

    // ── Row accounting, in stage order ──
    pub rows_fetched: usize,
    pub rows_dropped_unparseable: usize,
    pub rows_outside_window: usize,
    pub rows_dropped_negative: usize,
    pub rows_dropped_unkeyed: usize,
    pub rows_aggregated: usize,

    // ── Data quality ──
    /// Nulls per column in the normalized frame, before derived fields.
    pub null_columns: Vec<NullCount>,
}

/// Count nulls per column, listing only columns that have any.
pub fn null_profile(df: &DataFrame) -> Vec<NullCount> {
    df.get_columns()
        .iter()
        .filter(|column| column.null_count() > 0)
        .map(|column| NullCount {
            column: column.name().to_string(),
            nulls: column.null_count(),
        })
        .collect()
}
