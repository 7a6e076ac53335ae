//! Sink adapters.
//!
//! A sink persists the merged daily frame. Writes are atomic (write to .tmp,
//! rename into place) so a crashed run never leaves a half-written dataset
//! behind, and parent directories are created on demand.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::error::PipelineError;
use crate::schema::DAY;

/// A place the merged frame ends up.
pub trait SinkAdapter: Send + Sync {
    /// Name used in logs and the run summary.
    fn name(&self) -> &str;

    /// Persist the frame, returning the number of rows written.
    fn persist(&self, df: &DataFrame) -> Result<usize, PipelineError>;
}

fn sink_error(name: &str, reason: impl std::fmt::Display) -> PipelineError {
    PipelineError::Sink {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    }
}

fn with_atomic_file<F>(name: &str, path: &Path, write: F) -> Result<(), PipelineError>
where
    F: FnOnce(File) -> Result<(), PipelineError>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| sink_error(name, format!("failed to create dir: {e}")))?;
        }
    }
    let tmp = tmp_path(path);
    let file = File::create(&tmp).map_err(|e| sink_error(name, format!("create file: {e}")))?;
    if let Err(e) = write(file) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        sink_error(name, format!("atomic rename failed: {e}"))
    })
}

/// Columnar output, the default for downstream analytics.
pub struct ParquetSink {
    path: PathBuf,
}

impl ParquetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SinkAdapter for ParquetSink {
    fn name(&self) -> &str {
        "parquet"
    }

    fn persist(&self, df: &DataFrame) -> Result<usize, PipelineError> {
        with_atomic_file(self.name(), &self.path, |file| {
            ParquetWriter::new(file)
                .finish(&mut df.clone())
                .map_err(|e| sink_error("parquet", format!("write parquet: {e}")))?;
            Ok(())
        })?;
        Ok(df.height())
    }
}

/// One JSON document per row, the shape document stores ingest directly.
///
/// The `day` column is rendered as an ISO date string so consumers are not
/// handed days-since-epoch integers.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SinkAdapter for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn persist(&self, df: &DataFrame) -> Result<usize, PipelineError> {
        let mut out = if df.schema().contains(DAY) {
            df.clone()
                .lazy()
                .with_column(col(DAY).dt().to_string("%Y-%m-%d"))
                .collect()?
        } else {
            df.clone()
        };
        let rows = out.height();
        with_atomic_file(self.name(), &self.path, |file| {
            JsonWriter::new(file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(&mut out)
                .map_err(|e| sink_error("jsonl", format!("write jsonl: {e}")))
        })?;
        Ok(rows)
    }
}

/// Plain CSV with a header line.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SinkAdapter for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn persist(&self, df: &DataFrame) -> Result<usize, PipelineError> {
        with_atomic_file(self.name(), &self.path, |file| {
            CsvWriter::new(file)
                .include_header(true)
                .finish(&mut df.clone())
                .map_err(|e| sink_error("csv", format!("write csv: {e}")))
        })?;
        Ok(df.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn scratch_path(file: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("barstack_sink_test_{}_{}", std::process::id(), id))
            .join(file)
    }

    fn merged_frame() -> DataFrame {
        df![
            "symbol" => ["AAPL", "MSFT"],
            "day" => ["2025-03-15", "2025-03-16"],
            "close" => [101.5, 55.25],
        ]
        .unwrap()
        .lazy()
        .with_column(col("day").str().to_date(StrptimeOptions {
            format: Some("%Y-%m-%d".into()),
            ..Default::default()
        }))
        .collect()
        .unwrap()
    }

    #[test]
    fn parquet_round_trips_and_reports_rows() {
        let path = scratch_path("merged.parquet");
        let df = merged_frame();
        let written = ParquetSink::new(&path).persist(&df).unwrap();
        assert_eq!(written, 2);

        let back = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert!(back.equals(&df));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn jsonl_renders_days_as_iso_dates() {
        let path = scratch_path("merged.jsonl");
        let written = JsonlSink::new(&path).persist(&merged_frame()).unwrap();
        assert_eq!(written, 2);

        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().count(), 2);
        assert!(body.contains("\"2025-03-15\""));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn csv_writes_a_header_line() {
        let path = scratch_path("merged.csv");
        let written = CsvSink::new(&path).persist(&merged_frame()).unwrap();
        assert_eq!(written, 2);

        let body = std::fs::read_to_string(&path).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("symbol,day,close"));
        assert_eq!(lines.count(), 2);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn no_tmp_file_is_left_behind() {
        let path = scratch_path("merged.parquet");
        ParquetSink::new(&path).persist(&merged_frame()).unwrap();
        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn unwritable_target_is_a_sink_error() {
        // The parent of the target is a file, so dir creation must fail.
        let blocker = scratch_path("blocker");
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        std::fs::write(&blocker, b"x").unwrap();
        let sink = CsvSink::new(blocker.join("merged.csv"));
        assert!(matches!(
            sink.persist(&merged_frame()),
            Err(PipelineError::Sink { .. })
        ));
        std::fs::remove_dir_all(blocker.parent().unwrap()).ok();
    }
}
