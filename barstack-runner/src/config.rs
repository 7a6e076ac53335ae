//! Serializable pipeline configuration.
//!
//! One TOML document describes a whole run: every source (what kind it is,
//! where it lives, and the shape facts the pipeline needs) plus the sink the
//! merged frame lands in. Source order in the file is merge priority.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use barstack_core::sink::{CsvSink, JsonlSink, ParquetSink, SinkAdapter};
use barstack_core::source::{
    CsvFileSource, HttpCsvSource, HttpJsonSource, JsonlFileSource, SourceAdapter, SyntheticSource,
};
use barstack_core::SourceSchema;

/// Errors from loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtlConfig {
    /// Sources in merge-priority order: on key collisions, earlier wins.
    pub sources: Vec<SourceConfig>,
    pub sink: SinkConfig,
}

/// One source entry: a name, what kind of source it is, and the shape facts
/// its frames carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Name used in logs, reports, and error messages.
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
    #[serde(flatten)]
    pub schema: SourceSchema,
}

/// Where one source's rows come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// Local CSV file with a header line.
    Csv { path: PathBuf },
    /// Local JSON Lines file, one document per line.
    Jsonl { path: PathBuf },
    /// JSON endpoint, with rows optionally nested under `record_path`.
    HttpJson {
        url: String,
        #[serde(default)]
        record_path: Option<String>,
    },
    /// CSV endpoint.
    HttpCsv { url: String },
    /// Deterministic generated rows, `days` weekdays per symbol.
    Synthetic { symbols: Vec<String>, days: usize },
}

/// Where the merged frame lands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    Parquet { path: PathBuf },
    Jsonl { path: PathBuf },
    Csv { path: PathBuf },
}

impl EtlConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Example config with one profile per source kind, written by `barstack init`.
    pub fn example() -> String {
        r#"# Barstack pipeline configuration
# Source order is merge priority: on (symbol, day) collisions, earlier wins.

[[sources]]
name = "marketstack"
kind = "http_json"
url = "https://api.marketstack.com/v2/eod?access_key=YOUR_KEY&symbols=AAPL,MSFT"
record_path = "data"
timestamp_column = "date"
symbol_column = "symbol"
year = 2025

[[sources]]
name = "world_stocks"
kind = "csv"
path = "data/World-Stock-Prices-Dataset.csv"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
# timestamp_format = "%Y-%m-%d %H:%M:%S%z"   # optional, inferred when omitted

[[sources]]
name = "local_2024"
kind = "csv"
path = "data/filtered_2024_stock_data.csv"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2024

[[sources]]
name = "archive_2023"
kind = "jsonl"
path = "data/financial_stocks_2023.jsonl"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2023

[[sources]]
name = "github_2022"
kind = "http_csv"
url = "https://raw.githubusercontent.com/your-org/stock-archives/main/filtered_2022_stock_data.csv"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2022

# Offline stand-in while wiring real sources up:
# [[sources]]
# name = "demo"
# kind = "synthetic"
# symbols = ["AAPL", "MSFT", "NVDA"]
# days = 60
# timestamp_column = "Date"
# symbol_column = "Ticker"
# year = 2025

[sink]
kind = "parquet"
path = "out/daily_bars.parquet"

# Alternative sinks:
# kind = "jsonl"
# path = "out/daily_bars.jsonl"
# kind = "csv"
# path = "out/daily_bars.csv"
"#
        .to_string()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one source is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::Invalid("source names must be non-empty".into()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            if !(1000..=9999).contains(&source.schema.year) {
                return Err(ConfigError::Invalid(format!(
                    "source '{}': year {} is outside 1000..=9999",
                    source.name, source.schema.year
                )));
            }
            if let SourceKind::Synthetic { symbols, days } = &source.kind {
                if symbols.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "source '{}': synthetic sources need at least one symbol",
                        source.name
                    )));
                }
                // 260 is the weekday count of the shortest year, so generated
                // rows never spill into the next one.
                if !(1..=260).contains(days) {
                    return Err(ConfigError::Invalid(format!(
                        "source '{}': synthetic days must be within 1..=260",
                        source.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl SourceConfig {
    /// Instantiate the adapter this entry describes.
    pub fn build(&self) -> Box<dyn SourceAdapter> {
        match &self.kind {
            SourceKind::Csv { path } => {
                Box::new(CsvFileSource::new(&self.name, path, self.schema.clone()))
            }
            SourceKind::Jsonl { path } => {
                Box::new(JsonlFileSource::new(&self.name, path, self.schema.clone()))
            }
            SourceKind::HttpJson { url, record_path } => Box::new(HttpJsonSource::new(
                &self.name,
                url,
                record_path.clone(),
                self.schema.clone(),
            )),
            SourceKind::HttpCsv { url } => {
                Box::new(HttpCsvSource::new(&self.name, url, self.schema.clone()))
            }
            SourceKind::Synthetic { symbols, days } => Box::new(SyntheticSource::new(
                &self.name,
                symbols.clone(),
                *days,
                self.schema.clone(),
            )),
        }
    }
}

impl SinkConfig {
    /// Instantiate the sink this entry describes.
    pub fn build(&self) -> Box<dyn SinkAdapter> {
        match self {
            SinkConfig::Parquet { path } => Box::new(ParquetSink::new(path)),
            SinkConfig::Jsonl { path } => Box::new(JsonlSink::new(path)),
            SinkConfig::Csv { path } => Box::new(CsvSink::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[[sources]]
name = "marketstack"
kind = "http_json"
url = "https://example.com/eod.json"
record_path = "data"
timestamp_column = "date"
symbol_column = "symbol"
year = 2025

[[sources]]
name = "kaggle"
kind = "csv"
path = "data/world_stocks.csv"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%d %H:%M:%S"

[[sources]]
name = "archive"
kind = "jsonl"
path = "data/bars.jsonl"
timestamp_column = "date"
symbol_column = "symbol"
year = 2023

[[sources]]
name = "github"
kind = "http_csv"
url = "https://example.com/prices.csv"
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2022

[[sources]]
name = "demo"
kind = "synthetic"
symbols = ["AAPL", "MSFT"]
days = 10
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025
timestamp_format = "%Y-%m-%dT%H:%M:%S"

[sink]
kind = "parquet"
path = "out/merged.parquet"
"#;

    #[test]
    fn parses_a_full_document() {
        let config = EtlConfig::from_toml(FULL_CONFIG).unwrap();
        assert_eq!(config.sources.len(), 5);
        assert_eq!(config.sources[0].name, "marketstack");
        assert!(matches!(
            &config.sources[0].kind,
            SourceKind::HttpJson { record_path: Some(p), .. } if p == "data"
        ));
        assert_eq!(config.sources[1].schema.timestamp_column, "Date");
        assert_eq!(
            config.sources[1].schema.timestamp_format.as_deref(),
            Some("%Y-%m-%d %H:%M:%S")
        );
        assert_eq!(config.sources[2].schema.year, 2023);
        assert!(matches!(
            &config.sink,
            SinkConfig::Parquet { path } if path == &PathBuf::from("out/merged.parquet")
        ));
    }

    #[test]
    fn timestamp_format_defaults_to_none() {
        let config = EtlConfig::from_toml(FULL_CONFIG).unwrap();
        assert_eq!(config.sources[0].schema.timestamp_format, None);
    }

    #[test]
    fn built_adapters_carry_their_names() {
        let config = EtlConfig::from_toml(FULL_CONFIG).unwrap();
        for entry in &config.sources {
            assert_eq!(entry.build().name(), entry.name);
        }
        let synthetic = config.sources[4].build();
        assert!(synthetic.is_synthetic());
    }

    #[test]
    fn rejects_an_empty_source_list() {
        let err = EtlConfig::from_toml("sources = []\n[sink]\nkind = \"csv\"\npath = \"x.csv\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_source_names() {
        let raw = r#"
[[sources]]
name = "twin"
kind = "synthetic"
symbols = ["AAPL"]
days = 5
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025

[[sources]]
name = "twin"
kind = "synthetic"
symbols = ["MSFT"]
days = 5
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025

[sink]
kind = "csv"
path = "out.csv"
"#;
        let err = EtlConfig::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate source name"));
    }

    #[test]
    fn rejects_synthetic_without_symbols() {
        let raw = r#"
[[sources]]
name = "demo"
kind = "synthetic"
symbols = []
days = 5
timestamp_column = "Date"
symbol_column = "Ticker"
year = 2025

[sink]
kind = "csv"
path = "out.csv"
"#;
        assert!(EtlConfig::from_toml(raw).is_err());
    }

    #[test]
    fn rejects_out_of_range_years() {
        let raw = r#"
[[sources]]
name = "demo"
kind = "synthetic"
symbols = ["AAPL"]
days = 5
timestamp_column = "Date"
symbol_column = "Ticker"
year = 25

[sink]
kind = "csv"
path = "out.csv"
"#;
        let err = EtlConfig::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EtlConfig::from_file(Path::new("/nonexistent/barstack.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn example_config_is_valid() {
        let config = EtlConfig::from_toml(&EtlConfig::example()).unwrap();
        assert_eq!(config.sources.len(), 5);
        assert!(matches!(config.sink, SinkConfig::Parquet { .. }));
    }
}
