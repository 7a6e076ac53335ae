//! End-to-end pipeline tests: file fixtures through `run_once` to a sink.
//!
//! Each test writes real CSV files into a temp dir, drives the runner off a
//! TOML config, and reads the persisted Parquet back to check the merged
//! dataset.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use barstack_core::{PipelineError, DAY, SYMBOL};
use barstack_runner::{run_once, EtlConfig, RunError};

fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn read_parquet(path: &Path) -> DataFrame {
    let file = std::fs::File::open(path).unwrap();
    ParquetReader::new(file).finish().unwrap()
}

fn sorted_by_key(df: DataFrame) -> DataFrame {
    df.lazy()
        .sort([SYMBOL, DAY], SortMultipleOptions::default())
        .collect()
        .unwrap()
}

fn day_strings(df: &DataFrame) -> Vec<String> {
    let rendered = df
        .clone()
        .lazy()
        .select([col(DAY).dt().to_string("%Y-%m-%d").alias(DAY)])
        .collect()
        .unwrap();
    rendered
        .column(DAY)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|d| d.unwrap().to_string())
        .collect()
}

#[test]
fn two_sources_merge_first_seen_wins() {
    let dir = tempfile::tempdir().unwrap();
    let alpha = write_csv(
        dir.path(),
        "alpha.csv",
        "Date,Ticker,Open,High,Low,Close,Volume\n\
         2025-03-15,AAPL,10.0,12.0,9.0,11.0,100\n\
         2025-03-16,AAPL,11.0,13.0,10.0,12.0,150\n",
    );
    let beta = write_csv(
        dir.path(),
        "beta.csv",
        "Date,Ticker,Open,High,Low,Close,Volume\n\
         2025-03-15,AAPL,99.0,99.0,99.0,99.0,999\n\
         2025-03-15,MSFT,20.0,22.0,19.0,21.0,200\n",
    );
    let out = dir.path().join("merged.parquet");

    let config = EtlConfig::from_toml(&format!(
        r#"
[[sources]]
name = "alpha"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%d"

[[sources]]
name = "beta"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%d"

[sink]
kind = "parquet"
path = "{}"
"#,
        alpha.display(),
        beta.display(),
        out.display()
    ))
    .unwrap();

    let summary = run_once(&config).unwrap();
    assert_eq!(summary.merged_rows, 3);
    assert_eq!(summary.persisted_rows, 3);
    assert_eq!(summary.sources.len(), 2);
    assert!(!summary.has_synthetic);

    // Sorted: (AAPL, 03-15), (AAPL, 03-16), (MSFT, 03-15). The colliding
    // AAPL row keeps alpha's close, not beta's 99.0.
    let merged = sorted_by_key(read_parquet(&out));
    assert_eq!(merged.height(), 3);
    let close = merged.column("close").unwrap().f64().unwrap();
    assert_eq!(close.get(0), Some(11.0));
    assert_eq!(close.get(1), Some(12.0));
    assert_eq!(close.get(2), Some(21.0));
}

#[test]
fn intraday_rows_collapse_to_one_daily_bar() {
    let dir = tempfile::tempdir().unwrap();
    let ticks = write_csv(
        dir.path(),
        "ticks.csv",
        "Date,Ticker,Open,High,Low,Close,Volume\n\
         2025-04-01 09:30:00,AAPL,10.0,11.0,9.5,10.5,100\n\
         2025-04-01 12:00:00,AAPL,10.5,12.5,9.0,11.0,200\n\
         2025-04-01 16:00:00,AAPL,11.0,12.0,10.0,11.5,300\n",
    );
    let out = dir.path().join("merged.parquet");

    let config = EtlConfig::from_toml(&format!(
        r#"
[[sources]]
name = "ticks"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%d %H:%M:%S"

[sink]
kind = "parquet"
path = "{}"
"#,
        ticks.display(),
        out.display()
    ))
    .unwrap();

    let summary = run_once(&config).unwrap();
    assert_eq!(summary.merged_rows, 1);

    let merged = read_parquet(&out);
    assert_eq!(merged.height(), 1);
    assert_eq!(merged.column("volume").unwrap().i64().unwrap().get(0), Some(600));
    assert_eq!(merged.column("high").unwrap().f64().unwrap().get(0), Some(12.5));
    assert_eq!(merged.column("low").unwrap().f64().unwrap().get(0), Some(9.0));
    assert_eq!(merged.column("close").unwrap().f64().unwrap().get(0), Some(11.0));
    // Derived columns survive aggregation as daily means.
    assert!(merged.schema().contains("daily_return"));
    assert!(merged.schema().contains("volatility"));
}

#[test]
fn year_boundary_rows_land_in_utc_year() {
    let dir = tempfile::tempdir().unwrap();
    let zoned = write_csv(
        dir.path(),
        "zoned.csv",
        "Date,Ticker,Open,High,Low,Close,Volume\n\
         2024-12-31T23:30:00-0500,AAPL,10.0,12.0,9.0,11.0,100\n\
         2025-06-15T12:00:00+0000,AAPL,11.0,13.0,10.0,12.0,150\n\
         2024-06-15T12:00:00+0000,AAPL,1.0,1.0,1.0,1.0,10\n",
    );
    let out = dir.path().join("merged.parquet");

    let config = EtlConfig::from_toml(&format!(
        r#"
[[sources]]
name = "zoned"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%dT%H:%M:%S%z"

[sink]
kind = "parquet"
path = "{}"
"#,
        zoned.display(),
        out.display()
    ))
    .unwrap();

    let summary = run_once(&config).unwrap();
    assert_eq!(summary.sources[0].rows_outside_window, 1);
    assert_eq!(summary.merged_rows, 2);

    // 23:30 at UTC-5 on New Year's Eve is 04:30 on Jan 1 in UTC, so the row
    // belongs to the 2025 window under the 2025-01-01 day key.
    let merged = sorted_by_key(read_parquet(&out));
    assert_eq!(day_strings(&merged), vec!["2025-01-01", "2025-06-15"]);
}

#[test]
fn a_missing_source_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.parquet");

    let config = EtlConfig::from_toml(&format!(
        r#"
[[sources]]
name = "ghost"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025

[sink]
kind = "parquet"
path = "{}"
"#,
        dir.path().join("does_not_exist.csv").display(),
        out.display()
    ))
    .unwrap();

    let err = run_once(&config).unwrap_err();
    assert!(matches!(
        err,
        RunError::Pipeline(PipelineError::SourceUnavailable { .. })
    ));
    assert!(err.to_string().contains("'ghost'"));
    // Nothing is persisted on an aborted run.
    assert!(!out.exists());
}

#[test]
fn summary_accounts_for_every_dropped_row() {
    let dir = tempfile::tempdir().unwrap();
    let messy = write_csv(
        dir.path(),
        "messy.csv",
        "Date,Ticker,Open,High,Low,Close,Volume\n\
         2025-03-15,AAPL,10.0,12.0,9.0,11.0,100\n\
         2025-03-16,AAPL,11.0,13.0,10.0,12.0,150\n\
         not-a-date,AAPL,1.0,1.0,1.0,1.0,10\n\
         2024-07-01,AAPL,1.0,1.0,1.0,1.0,10\n\
         2025-03-17,,1.0,1.0,1.0,1.0,10\n\
         2025-03-18,AAPL,5.0,6.0,4.0,-5.0,10\n",
    );
    let out = dir.path().join("merged.parquet");

    let config = EtlConfig::from_toml(&format!(
        r#"
[[sources]]
name = "messy"
kind = "csv"
path = "{}"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%d"

[sink]
kind = "parquet"
path = "{}"
"#,
        messy.display(),
        out.display()
    ))
    .unwrap();

    let summary = run_once(&config).unwrap();
    let report = &summary.sources[0];
    assert_eq!(report.rows_fetched, 6);
    assert_eq!(report.rows_dropped_unparseable, 1);
    assert_eq!(report.rows_outside_window, 1);
    assert_eq!(report.rows_dropped_negative, 1);
    assert_eq!(report.rows_dropped_unkeyed, 1);
    assert_eq!(report.rows_aggregated, 2);

    // The unkeyed row shows up in the null profile before it is dropped.
    assert!(report
        .null_columns
        .iter()
        .any(|nc| nc.column == "ticker" && nc.nulls == 1));

    assert_eq!(read_parquet(&out).height(), 2);
}
