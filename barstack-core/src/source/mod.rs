//! Source adapters.
//!
//! The SourceAdapter trait abstracts over where raw frames come from (local
//! files, HTTP endpoints, generated data) so the runner treats every
//! configured source identically and tests can swap in fixtures.

use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::SourceSchema;

pub mod file;
pub mod http;
pub mod synthetic;

pub use file::{CsvFileSource, JsonlFileSource};
pub use http::{HttpCsvSource, HttpJsonSource};
pub use synthetic::SyntheticSource;

/// A place raw rows come from.
///
/// Implementations produce one frame per fetch. Everything the pipeline needs
/// to know about that frame's shape (timestamp column, key column, target
/// year) is declared up front via [`schema`](SourceAdapter::schema), never
/// discovered by sniffing the data.
pub trait SourceAdapter: Send + Sync {
    /// Name used in logs, reports, and error messages.
    fn name(&self) -> &str;

    /// Declared shape facts for frames this source produces.
    fn schema(&self) -> &SourceSchema;

    /// Fetch the raw frame.
    fn fetch(&self) -> Result<DataFrame, PipelineError>;

    /// Whether rows are generated rather than observed.
    fn is_synthetic(&self) -> bool {
        false
    }
}
