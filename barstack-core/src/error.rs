//! Pipeline error types.
//!
//! Three failure classes cross the pipeline boundary: timestamp columns that
//! cannot be parsed (`Parse`), structural preconditions violated on the way
//! into aggregation or merge (`SchemaMismatch`), and adapter-level fetch or
//! persist failures (`SourceUnavailable`, `Sink`). Row-level data problems
//! never surface here; bad rows are filtered out and counted in the stage
//! report instead.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The designated timestamp column is absent or its dtype cannot hold a
    /// timestamp. Value-level parse failures are not errors: those rows are
    /// dropped and counted.
    #[error("timestamp column '{column}' unusable: {reason}")]
    Parse { column: String, reason: String },

    /// A structural precondition failed entering the aggregator or merger,
    /// or column names collided after normalization. Indicates upstream
    /// misconfiguration, not bad data; fatal for the run.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A source adapter could not produce its dataset. Fatal for the run.
    #[error("source '{name}' unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// A sink adapter could not persist the merged dataset.
    #[error("sink '{name}' failed: {reason}")]
    Sink { name: String, reason: String },

    /// Frame engine failure outside the classes above.
    #[error(transparent)]
    Frame(#[from] PolarsError),
}
