//! Barstack Core — sources, transforms, merge, and sinks for daily stock bars.
//!
//! This crate contains the heart of the ETL pipeline:
//! - Source adapters (local CSV, JSON Lines, HTTP JSON/CSV, synthetic)
//! - The per-source transform chain (window filter, normalization, derived
//!   features, validation, daily aggregation)
//! - Cross-source merge with first-seen-wins deduplication
//! - Sink adapters (Parquet, JSON Lines, CSV) with atomic writes
//! - Per-source row accounting for run summaries

pub mod error;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod sink;
pub mod source;
pub mod transform;

pub use error::PipelineError;
pub use pipeline::transform_source;
pub use report::{NullCount, SourceReport};
pub use schema::{SourceSchema, BRAND, DAY, PRICE_FIELDS, SYMBOL};
pub use sink::SinkAdapter;
pub use source::SourceAdapter;
