//! File-backed sources: CSV and JSON Lines.

use std::fs::File;
use std::path::PathBuf;

use polars::prelude::*;

use super::SourceAdapter;
use crate::error::PipelineError;
use crate::schema::SourceSchema;

/// Rows from a local CSV file with a header line.
pub struct CsvFileSource {
    name: String,
    path: PathBuf,
    schema: SourceSchema,
}

impl CsvFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, schema: SourceSchema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            schema,
        }
    }
}

impl SourceAdapter for CsvFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn fetch(&self) -> Result<DataFrame, PipelineError> {
        LazyCsvReader::new(&self.path)
            .with_has_header(true)
            .finish()
            .and_then(LazyFrame::collect)
            .map_err(|e| PipelineError::SourceUnavailable {
                name: self.name.clone(),
                reason: e.to_string(),
            })
    }
}

/// Rows from a local JSON Lines file, one document per line.
///
/// Document-store exports carry an `_id` field; it is infrastructure, not
/// data, and is dropped before the frame reaches the pipeline.
pub struct JsonlFileSource {
    name: String,
    path: PathBuf,
    schema: SourceSchema,
}

impl JsonlFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, schema: SourceSchema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            schema,
        }
    }
}

impl SourceAdapter for JsonlFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn fetch(&self) -> Result<DataFrame, PipelineError> {
        let unavailable = |reason: String| PipelineError::SourceUnavailable {
            name: self.name.clone(),
            reason,
        };
        let file = File::open(&self.path).map_err(|e| unavailable(e.to_string()))?;
        let df = JsonLineReader::new(file)
            .finish()
            .map_err(|e| unavailable(e.to_string()))?;
        if df.schema().contains("_id") {
            return Ok(df.drop("_id")?);
        }
        Ok(df)
    }
}
