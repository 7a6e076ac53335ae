//! Schema normalization.
//!
//! Column names arrive as `" Date "`, `"Brand_Name"`, `"Close Price"`, and
//! similar spellings that differ per source. Normalization rewrites every
//! name to lowercase with surrounding whitespace stripped and internal
//! spaces replaced by underscores, leaving cell values untouched. The
//! operation is idempotent, so running it on already-normalized data is a
//! no-op.

use polars::prelude::*;
use std::collections::HashSet;

use crate::error::PipelineError;

/// Normalize a single column name: trim, lowercase, spaces to underscores.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Rewrite all column names of `df` through [`normalize_name`].
///
/// Cell values are never altered. Two raw names that normalize to the same
/// spelling cannot coexist in one frame; that case fails with
/// [`PipelineError::SchemaMismatch`] rather than silently shadowing one of
/// the columns.
pub fn normalize_columns(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .map(|name| (name.to_string(), normalize_name(name.as_str())))
        .collect();

    let mut seen = HashSet::with_capacity(renames.len());
    for (raw, normalized) in &renames {
        if !seen.insert(normalized.clone()) {
            return Err(PipelineError::SchemaMismatch(format!(
                "columns collide on '{normalized}' after normalization (raw name '{raw}')"
            )));
        }
    }

    let mut out = df.clone();
    for (raw, normalized) in renames {
        if raw != normalized {
            out.rename(&raw, normalized.into())?;
        }
    }
    Ok(out)
}

/// Title-case the values of a free-text string column, when present.
///
/// Sources spell company names with inconsistent casing (`"apple inc."`,
/// `"APPLE INC."`); this maps each to `"Apple Inc."`. A frame without the
/// column, or with a non-string dtype under that name, passes through
/// unchanged. Null values stay null.
pub fn titlecase_column(df: &DataFrame, column: &str) -> Result<DataFrame, PipelineError> {
    match df.schema().get(column) {
        Some(DataType::String) => {}
        _ => return Ok(df.clone()),
    }

    let ca = df.column(column)?.str()?;
    let tidied: StringChunked = ca.into_iter().map(|value| value.map(title_case)).collect();

    let mut out = df.clone();
    out.replace(column, tidied.with_name(column.into()).into_series())?;
    Ok(out)
}

/// Uppercase the first alphabetic character after each non-alphabetic
/// boundary, lowercase the rest. Preserves all non-alphabetic characters.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_boundary = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_boundary = false;
        } else {
            out.push(ch);
            at_boundary = true;
        }
    }
    out
}
