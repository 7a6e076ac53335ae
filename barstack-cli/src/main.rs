//! Barstack CLI — run, watch, preview, and compare commands.
//!
//! Commands:
//! - `run` — execute one full pipeline pass, optionally saving run artifacts
//! - `watch` — run the pipeline once per day at a fixed UTC time
//! - `preview` — fetch and transform a single source, print its stage report
//!   without touching the sink
//! - `compare` — print a drift report between two saved runs
//! - `init` — write an example config file to start from

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use barstack_runner::{
    generate_comparison, load_artifacts, preview_source, run_once, save_artifacts, watch,
    EtlConfig, RunSummary,
};

#[derive(Parser)]
#[command(
    name = "barstack",
    about = "Barstack CLI — multi-source daily stock bar pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one full pipeline pass: fetch, transform, merge, persist.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Directory for run artifacts (manifest, report). Skipped if absent.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },
    /// Run the pipeline once per day at a fixed UTC time.
    Watch {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Daily fire time, 24h UTC (HH:MM).
        #[arg(long, default_value = "06:00")]
        at: String,
    },
    /// Fetch and transform one configured source, skipping merge and sink.
    Preview {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Name of the configured source to preview.
        source: String,
    },
    /// Print a Markdown drift report comparing two saved runs.
    Compare {
        /// Artifact directory of the baseline run.
        baseline: PathBuf,

        /// Artifact directory of the run to compare against it.
        candidate: PathBuf,
    },
    /// Write an example config file to edit and run.
    Init {
        /// Where to write the config.
        #[arg(long, default_value = "barstack.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, artifacts } => run_cmd(&config, artifacts.as_deref()),
        Commands::Watch { config, at } => watch_cmd(&config, &at),
        Commands::Preview { config, source } => preview_cmd(&config, &source),
        Commands::Compare {
            baseline,
            candidate,
        } => compare_cmd(&baseline, &candidate),
        Commands::Init { output } => init_cmd(&output),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_cmd(config_path: &Path, artifacts: Option<&Path>) -> Result<()> {
    let config = EtlConfig::from_file(config_path)?;
    info!(
        "loaded {} sources from {}",
        config.sources.len(),
        config_path.display()
    );

    let summary = run_once(&config)?;
    print_summary(&summary);

    if let Some(output_dir) = artifacts {
        let run_dir = save_artifacts(&summary, output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn watch_cmd(config_path: &Path, at: &str) -> Result<()> {
    let fire_at = match NaiveTime::parse_from_str(at, "%H:%M") {
        Ok(t) => t,
        Err(_) => bail!("invalid --at '{at}': expected HH:MM (24h UTC)"),
    };
    let config = EtlConfig::from_file(config_path)?;
    watch(&config, fire_at)
}

fn preview_cmd(config_path: &Path, source: &str) -> Result<()> {
    let config = EtlConfig::from_file(config_path)?;
    let (daily, report) = preview_source(&config, source)?;

    println!();
    println!("=== Source Preview: {} ===", report.source);
    println!("Rows fetched:    {}", report.rows_fetched);
    println!("Unparseable:     {}", report.rows_dropped_unparseable);
    println!("Outside window:  {}", report.rows_outside_window);
    println!("Negative rows:   {}", report.rows_dropped_negative);
    println!("Unkeyed rows:    {}", report.rows_dropped_unkeyed);
    println!("Daily rows:      {}", report.rows_aggregated);
    for nc in &report.null_columns {
        println!("Nulls:           {} in '{}'", nc.nulls, nc.column);
    }
    if report.synthetic {
        println!();
        println!("WARNING: source generates SYNTHETIC data");
    }
    println!();
    println!("{}", daily.head(Some(10)));

    Ok(())
}

fn compare_cmd(baseline: &Path, candidate: &Path) -> Result<()> {
    let a = load_artifacts(baseline)?;
    let b = load_artifacts(candidate)?;
    println!("{}", generate_comparison(&a, &b));
    Ok(())
}

fn init_cmd(output: &Path) -> Result<()> {
    std::fs::write(output, EtlConfig::example())?;
    println!("Created example configuration file: {}", output.display());
    println!("\nEdit it to point at your sources, then run:");
    println!("  barstack run --config {}", output.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Pipeline Run ===");
    println!(
        "Started:         {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Finished:        {}",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Merged rows:     {}", summary.merged_rows);
    println!("Persisted rows:  {}", summary.persisted_rows);
    println!("Sink:            {}", summary.sink);
    println!("Dataset hash:    {}", summary.dataset_hash);
    println!();
    println!(
        "{:<14} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Source", "Fetched", "Invalid", "Outside", "Negative", "Unkeyed", "Daily"
    );
    println!("{}", "-".repeat(68));
    for report in &summary.sources {
        let tag = if report.synthetic { " (synthetic)" } else { "" };
        println!(
            "{:<14} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}{}",
            report.source,
            report.rows_fetched,
            report.rows_dropped_unparseable,
            report.rows_outside_window,
            report.rows_dropped_negative,
            report.rows_dropped_unkeyed,
            report.rows_aggregated,
            tag
        );
    }
    if summary.has_synthetic {
        println!();
        println!("WARNING: dataset contains SYNTHETIC rows");
    }
    println!();
}
