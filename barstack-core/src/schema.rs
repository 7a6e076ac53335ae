//! Canonical column vocabulary and per-source declared schema facts.
//!
//! Source schemas vary in naming and casing; everything downstream of the
//! normalizer speaks the lowercase vocabulary defined here. A source declares
//! exactly three facts about itself (timestamp column, key column, target
//! year) plus an optional timestamp format; the pipeline is schema-agnostic
//! beyond those.

use polars::prelude::DataType;
use serde::{Deserialize, Serialize};

/// Canonical grouping-key column in aggregated and merged output.
pub const SYMBOL: &str = "symbol";

/// Canonical calendar-day column (UTC date) in aggregated and merged output.
pub const DAY: &str = "day";

/// Free-text company-name column, tidied when present.
pub const BRAND: &str = "brand_name";

/// Numeric fields the validator screens and the aggregator reduces.
pub const PRICE_FIELDS: [&str; 5] = ["open", "close", "high", "low", "volume"];

/// The facts a source declares about its raw tabular shape.
///
/// Column names are the raw, pre-normalization spellings (`"Date"`, not
/// `"date"`); the pipeline normalizes them alongside the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    /// Raw name of the column holding the record timestamp.
    pub timestamp_column: String,
    /// Raw name of the column holding the symbol/ticker key.
    pub symbol_column: String,
    /// Target calendar year (UTC) for the time window filter.
    pub year: i32,
    /// strptime format for string timestamps; engine inference when absent.
    #[serde(default)]
    pub timestamp_format: Option<String>,
}

/// Dtypes the validator treats as numeric.
pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}
