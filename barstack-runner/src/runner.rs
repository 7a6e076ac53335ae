//! Run orchestration — wires sources, the transform chain, merge, and sink.
//!
//! Two entry points:
//! - `run_once()`: fetch every configured source, transform, merge, persist.
//!   Used by the CLI and the watch loop.
//! - `preview_source()`: fetch and transform a single source without touching
//!   the sink. Used for config debugging.

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use barstack_core::transform::merge_aggregates;
use barstack_core::{transform_source, PipelineError, SourceReport, DAY, SYMBOL};

use crate::config::{ConfigError, EtlConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Current schema version for persisted run summaries.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub merged_rows: usize,
    pub persisted_rows: usize,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub sink: String,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Execute one complete run: fetch every source, transform, merge, persist.
///
/// A failing source aborts the whole run; a partial dataset is never written.
/// The summary records per-source row accounting, a content hash of the
/// merged frame, and whether any synthetic rows are present.
pub fn run_once(config: &EtlConfig) -> Result<RunSummary, RunError> {
    let started_at = Utc::now();

    let mut frames = Vec::with_capacity(config.sources.len());
    let mut reports = Vec::with_capacity(config.sources.len());
    let mut has_synthetic = false;

    for entry in &config.sources {
        let source = entry.build();
        info!("fetching source '{}'", source.name());
        let raw = source.fetch()?;
        let (daily, mut report) = transform_source(source.name(), raw, source.schema())?;
        report.synthetic = source.is_synthetic();
        has_synthetic |= report.synthetic;
        frames.push(daily);
        reports.push(report);
    }

    let merged = merge_aggregates(&frames)?;
    let dataset_hash = dataset_hash(&merged)?;

    let sink = config.sink.build();
    let persisted_rows = sink.persist(&merged)?;
    info!(
        "run complete: {} merged rows persisted to {} sink",
        persisted_rows,
        sink.name()
    );

    Ok(RunSummary {
        schema_version: SCHEMA_VERSION,
        started_at,
        finished_at: Utc::now(),
        sources: reports,
        merged_rows: merged.height(),
        persisted_rows,
        dataset_hash,
        has_synthetic,
        sink: sink.name().to_string(),
    })
}

/// Fetch and transform a single named source, skipping merge and sink.
pub fn preview_source(
    config: &EtlConfig,
    name: &str,
) -> Result<(DataFrame, SourceReport), RunError> {
    let entry = config
        .sources
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ConfigError::Invalid(format!("no source named '{name}'")))?;
    let source = entry.build();
    let raw = source.fetch()?;
    let (daily, mut report) = transform_source(source.name(), raw, source.schema())?;
    report.synthetic = source.is_synthetic();
    Ok((daily, report))
}

/// Content hash of the merged dataset.
///
/// Rows are sorted by (symbol, day) before hashing, so the hash identifies
/// the dataset's content independent of row order.
fn dataset_hash(df: &DataFrame) -> Result<String, PipelineError> {
    if df.height() == 0 {
        return Ok(blake3::hash(b"").to_hex().to_string());
    }
    let mut sorted = df
        .clone()
        .lazy()
        .sort([SYMBOL, DAY], SortMultipleOptions::default())
        .collect()?;
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut sorted)?;
    Ok(blake3::hash(&buf).to_hex().to_string())
}
