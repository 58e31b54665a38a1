//! High-level pipeline API over files.
//!
//! Combines reading, transformation or profiling, and writing.
//!
//! # Example
//!
//! ```rust,no_run
//! use matterload::transform::{transform_file, ColumnMap, DuplicatePolicy, TransformConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TransformConfig::new(ColumnMap::parse(["ID:ClientMatterCode", "Name"])?)
//!         .with_duplicates(DuplicatePolicy::KeepFirst);
//!     let outcome = transform_file("matters.xlsx", "upload/matters.csv", &config)?;
//!
//!     println!("{}", outcome.result.summary());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::executor::{transform, TransformConfig, TransformResult};
use crate::error::{PipelineError, PipelineResult, TransformError};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{Table, ValidationIssue};
use crate::parser::{read_file, SourceFormat};
use crate::profile::{profile, ProfileOptions, ProfileReport};
use crate::writer::write_csv;

/// What was read from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub path: String,
    pub format: SourceFormat,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    pub columns: Vec<String>,
    pub row_count: usize,
}

/// Read a file and describe it.
pub fn read_source<P: AsRef<Path>>(path: P) -> PipelineResult<(Table, SourceInfo)> {
    let path = path.as_ref();
    log_info(format!("Reading {}", path.display()));

    let parsed = read_file(path)?;
    let info = SourceInfo {
        path: path.display().to_string(),
        format: parsed.format,
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        columns: parsed.table.columns().to_vec(),
        row_count: parsed.table.row_count(),
    };

    if let Some(encoding) = &info.encoding {
        log_info_indent(format!("Encoding: {}", encoding), 1);
    }
    if let Some(delimiter) = info.delimiter {
        log_info_indent(format!("Delimiter: {:?}", delimiter), 1);
    }
    log_info_indent(
        format!("{} rows, {} columns", info.row_count, info.columns.len()),
        1,
    );

    Ok((parsed.table, info))
}

/// Result of [`transform_file`].
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub source: SourceInfo,
    pub output: String,
    pub result: TransformResult,
}

impl TransformOutcome {
    /// Build the JSON report for this run.
    pub fn report<'a>(&'a self, config: &'a TransformConfig) -> TransformReport<'a> {
        TransformReport {
            generated_at: Utc::now(),
            source: &self.source,
            output: &self.output,
            config,
            rows_in: self.result.rows_in,
            rows_out: self.result.rows_out,
            rows_dropped: self.result.rows_dropped,
            issues: &self.result.issues,
        }
    }
}

/// JSON report of a transform run: counts and every row-level issue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: &'a SourceInfo,
    pub output: &'a str,
    pub config: &'a TransformConfig,
    pub rows_in: usize,
    pub rows_out: usize,
    pub rows_dropped: usize,
    pub issues: &'a [ValidationIssue],
}

/// Read `input`, transform it and write the result to `output`.
///
/// Nothing is written when the transformation fails.
pub fn transform_file<P, Q>(input: P, output: Q, config: &TransformConfig) -> PipelineResult<TransformOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output = output.as_ref();
    let (table, source) = read_source(input)?;

    config.mappings.validate_headers(table.columns())?;
    if table.is_empty() {
        return Err(TransformError::EmptyInput.into());
    }
    let result = transform(&table, config)?;

    if result.has_issues() {
        log_warning(format!("{} row-level issues found", result.issues.len()));
    }

    write_csv(&result.table, output)?;
    log_success(format!("Wrote {} rows to {}", result.rows_out, output.display()));

    Ok(TransformOutcome {
        source,
        output: output.display().to_string(),
        result,
    })
}

/// Read and profile a file.
pub fn profile_file<P: AsRef<Path>>(
    path: P,
    options: &ProfileOptions,
) -> PipelineResult<(ProfileReport, SourceInfo)> {
    let (table, source) = read_source(path)?;
    let report = profile(&table, options);

    for warning in &report.warnings {
        log_warning(warning.clone());
    }
    log_success(format!("Profiled {} rows", report.row_count));

    Ok((report, source))
}

/// Serialize a report as pretty JSON into a file.
pub fn write_report<T: Serialize, P: AsRef<Path>>(report: &T, path: P) -> PipelineResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;

    let io_error = |source| PipelineError::ReportIo {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, json).map_err(io_error)?;

    log_info(format!("Report written to {}", path.display()));
    Ok(())
}
