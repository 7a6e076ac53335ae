//! Run artifacts: JSON manifests, CSV stage reports, and Markdown summaries.
//!
//! Provides three export formats for pipeline runs:
//! - **JSON**: full round-trip serialization of [`RunSummary`] with schema versioning
//! - **CSV**: per-source row accounting for external analysis tools
//! - **Markdown**: human-readable single-run reports and two-run comparisons
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use barstack_core::SourceReport;

use crate::runner::{RunSummary, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunSummary` to pretty JSON.
pub fn export_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize RunSummary to JSON")
}

/// Deserialize a `RunSummary` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunSummary> {
    let summary: RunSummary =
        serde_json::from_str(json).context("failed to deserialize RunSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export per-source stage reports as CSV, one row per source.
///
/// Columns: source, synthetic, rows_fetched, rows_dropped_unparseable,
/// rows_outside_window, rows_dropped_negative, rows_dropped_unkeyed,
/// rows_aggregated
pub fn export_sources_csv(reports: &[SourceReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header
    wtr.write_record([
        "source",
        "synthetic",
        "rows_fetched",
        "rows_dropped_unparseable",
        "rows_outside_window",
        "rows_dropped_negative",
        "rows_dropped_unkeyed",
        "rows_aggregated",
    ])?;

    for r in reports {
        wtr.write_record([
            &r.source,
            &r.synthetic.to_string(),
            &r.rows_fetched.to_string(),
            &r.rows_dropped_unparseable.to_string(),
            &r.rows_outside_window.to_string(),
            &r.rows_dropped_negative.to_string(),
            &r.rows_dropped_unkeyed.to_string(),
            &r.rows_aggregated.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single pipeline run.
///
/// Creates a directory named `run_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json` — the full `RunSummary`
/// - `sources.csv` — per-source row accounting
/// - `report.md` — human-readable run report
///
/// Returns the path to the created directory.
pub fn save_artifacts(summary: &RunSummary, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    // manifest.json
    let json = export_json(summary)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    // sources.csv
    let csv = export_sources_csv(&summary.sources)?;
    std::fs::write(run_dir.join("sources.csv"), &csv)?;

    // report.md
    let report = generate_report(summary);
    std::fs::write(run_dir.join("report.md"), &report)?;

    Ok(run_dir)
}

/// Load a `RunSummary` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunSummary> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single pipeline run.
pub fn generate_report(summary: &RunSummary) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Pipeline Run Report\n\n");

    // Run metadata
    md.push_str("## Run\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Started | {} |\n", summary.started_at));
    md.push_str(&format!("| Finished | {} |\n", summary.finished_at));
    md.push_str(&format!("| Sink | {} |\n", summary.sink));
    md.push_str(&format!("| Merged Rows | {} |\n", summary.merged_rows));
    md.push_str(&format!("| Persisted Rows | {} |\n", summary.persisted_rows));
    md.push_str(&format!("| Dataset Hash | {} |\n", summary.dataset_hash));
    if summary.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    // Per-source row accounting, stages left to right
    md.push_str("## Sources\n\n");
    md.push_str(
        "| Source | Fetched | Unparseable | Outside Window | Negative | Unkeyed | Daily Rows |\n",
    );
    md.push_str("| --- | ---: | ---: | ---: | ---: | ---: | ---: |\n");
    for report in &summary.sources {
        let name = if report.synthetic {
            format!("{} (synthetic)", report.source)
        } else {
            report.source.clone()
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            name,
            report.rows_fetched,
            report.rows_dropped_unparseable,
            report.rows_outside_window,
            report.rows_dropped_negative,
            report.rows_dropped_unkeyed,
            report.rows_aggregated
        ));
    }
    md.push('\n');

    // Null profile
    if summary.sources.iter().any(|s| !s.null_columns.is_empty()) {
        md.push_str("## Null Columns\n\n");
        for report in &summary.sources {
            for nc in &report.null_columns {
                md.push_str(&format!(
                    "- {}: `{}` ({} nulls)\n",
                    report.source, nc.column, nc.nulls
                ));
            }
        }
        md.push('\n');
    }

    md
}

/// Generate a Markdown comparison report for two pipeline runs.
///
/// Intended for drift inspection between runs of the same configuration.
pub fn generate_comparison(a: &RunSummary, b: &RunSummary) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Run Comparison\n\n");

    // Run facts side by side
    md.push_str("## Runs\n\n");
    md.push_str("| Field | Run A | Run B |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!(
        "| Started | {} | {} |\n",
        a.started_at, b.started_at
    ));
    md.push_str(&format!("| Sink | {} | {} |\n", a.sink, b.sink));
    md.push_str(&format!(
        "| Sources | {} | {} |\n",
        a.sources.len(),
        b.sources.len()
    ));
    md.push_str(&format!(
        "| Synthetic Data | {} | {} |\n",
        yes_no(a.has_synthetic),
        yes_no(b.has_synthetic)
    ));
    md.push('\n');

    fn delta(a: usize, b: usize) -> String {
        let d = b as i64 - a as i64;
        if d >= 0 {
            format!("+{d}")
        } else {
            format!("{d}")
        }
    }

    // Per-source daily rows, union of both runs' sources
    md.push_str("## Daily Rows by Source\n\n");
    md.push_str("| Source | Run A | Run B | Delta |\n");
    md.push_str("| --- | ---: | ---: | ---: |\n");
    let mut names: Vec<&str> = a.sources.iter().map(|s| s.source.as_str()).collect();
    for report in &b.sources {
        if !names.contains(&report.source.as_str()) {
            names.push(&report.source);
        }
    }
    let cell = |r: Option<&SourceReport>| match r {
        Some(r) => r.rows_aggregated.to_string(),
        None => "-".into(),
    };
    for name in names {
        let ra = a.sources.iter().find(|s| s.source == name);
        let rb = b.sources.iter().find(|s| s.source == name);
        let d = match (ra, rb) {
            (Some(ra), Some(rb)) => delta(ra.rows_aggregated, rb.rows_aggregated),
            _ => "-".into(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            name,
            cell(ra),
            cell(rb),
            d
        ));
    }
    md.push('\n');

    // Totals
    md.push_str("## Totals\n\n");
    md.push_str("| Metric | Run A | Run B | Delta |\n");
    md.push_str("| --- | ---: | ---: | ---: |\n");
    md.push_str(&format!(
        "| Merged Rows | {} | {} | {} |\n",
        a.merged_rows,
        b.merged_rows,
        delta(a.merged_rows, b.merged_rows)
    ));
    md.push_str(&format!(
        "| Persisted Rows | {} | {} | {} |\n",
        a.persisted_rows,
        b.persisted_rows,
        delta(a.persisted_rows, b.persisted_rows)
    ));
    md.push('\n');

    // Hash verdict
    md.push_str("## Dataset Hash\n\n");
    md.push_str(&format!("- Run A: `{}`\n", a.dataset_hash));
    md.push_str(&format!("- Run B: `{}`\n", b.dataset_hash));
    if a.dataset_hash == b.dataset_hash {
        md.push_str("\nHashes match: the merged datasets are identical.\n");
    } else {
        md.push_str("\nHashes differ: the merged datasets have **drifted**.\n");
    }

    md
}

// ─── Helpers ────────────────────────────────────────────────────────

fn yes_no(v: bool) -> &'static str {
    if v {
        "yes"
    } else {
        "no"
    }
}
