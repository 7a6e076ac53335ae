//! Barstack Runner — pipeline orchestration, config, artifacts, scheduling.
//!
//! This crate builds on `barstack-core` to provide:
//! - TOML run configuration with validated source and sink profiles
//! - Single-pass runner producing a schema-versioned run summary
//! - JSON/CSV/Markdown artifact export with round-trip loading
//! - A daily schedule loop with a pure next-fire computation

pub mod config;
pub mod export;
pub mod runner;
pub mod schedule;

pub use config::{ConfigError, EtlConfig, SinkConfig, SourceConfig, SourceKind};
pub use export::{
    export_json, export_sources_csv, generate_comparison, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{preview_source, run_once, RunError, RunSummary, SCHEMA_VERSION};
pub use schedule::{next_fire, watch};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn etl_config_is_send_sync() {
        assert_send::<EtlConfig>();
        assert_sync::<EtlConfig>();
    }

    #[test]
    fn source_config_is_send_sync() {
        assert_send::<SourceConfig>();
        assert_sync::<SourceConfig>();
    }

    #[test]
    fn sink_config_is_send_sync() {
        assert_send::<SinkConfig>();
        assert_sync::<SinkConfig>();
    }

    #[test]
    fn run_summary_is_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
