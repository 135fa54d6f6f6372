//! Export of materialized statements.
//!
//! Every statement is written to its own file, named after the last segment
//! of its role URI. CSV files carry one line per row; JSON files carry the
//! whole statement including its definition and period kind.

use chrono::NaiveDate;
use folio::{ExtractionReport, OutputRow, Statement};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Longest file stem derived from a role URI.
pub const MAX_STEM_LEN: usize = 180;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::PrettyJson => f.write_str("pretty-json"),
        }
    }
}

/// One CSV line: dates and values flattened to text.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    role_uri: &'a str,
    depth: usize,
    label: &'a str,
    concept: &'a str,
    value: String,
    unit: &'a str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl<'a> From<&'a OutputRow> for CsvRecord<'a> {
    fn from(row: &'a OutputRow) -> Self {
        Self {
            role_uri: &row.role_uri,
            depth: row.depth,
            label: &row.label,
            concept: &row.concept,
            value: row.value.as_ref().map(ToString::to_string).unwrap_or_default(),
            unit: row.unit.as_deref().unwrap_or_default(),
            start: row.period_start,
            end: row.period_end,
        }
    }
}

fn rows_to_csv(rows: &[OutputRow]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record(["role_uri", "depth", "label", "concept", "value", "unit", "start", "end"])?;
    }
    for row in rows {
        wtr.serialize(CsvRecord::from(row))?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for Statement {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => rows_to_csv(&self.rows),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for ExtractionReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let rows: Vec<OutputRow> = self
                    .statements
                    .iter()
                    .flat_map(|s| s.rows.iter().cloned())
                    .collect();
                rows_to_csv(&rows)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// File stem for a role: the last URI segment with every run of characters
/// outside `[A-Za-z0-9_-]` replaced by one `_`, cut to [`MAX_STEM_LEN`].
///
/// A URI ending in `/` has an empty last segment and gets the stem `role`.
pub fn role_file_stem(role_uri: &str) -> String {
    let tail = role_uri.rsplit('/').next().unwrap_or_default();

    let mut stem = String::with_capacity(tail.len());
    let mut in_run = false;
    for c in tail.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            stem.push(c);
            in_run = false;
        } else if !in_run {
            stem.push('_');
            in_run = true;
        }
    }
    // only ASCII is left, so byte truncation is safe
    stem.truncate(MAX_STEM_LEN);

    if stem.is_empty() {
        "role".to_string()
    } else {
        stem
    }
}

/// Writes each statement to `dir`, creating it if needed.
///
/// Returns the written paths in statement order. Stems that collide get a
/// numeric suffix (`BalanceSheet`, `BalanceSheet_2`, ...).
pub fn export_statements(
    statements: &[Statement],
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;

    let mut used = HashSet::new();
    let mut paths = Vec::with_capacity(statements.len());

    for statement in statements {
        let base = role_file_stem(&statement.role_uri);
        let mut stem = base.clone();
        let mut n = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{base}_{n}");
            n += 1;
        }

        let path = dir.join(format!("{stem}.{}", format.extension()));
        statement.export_to_file(&path, format)?;
        tracing::debug!(role = %statement.role_uri, path = %path.display(), "wrote statement");
        paths.push(path);
    }

    Ok(paths)
}
