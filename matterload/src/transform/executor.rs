//! Transformer
//!
//! Runs a [`TransformConfig`] over a table: projection, cell cleaning, key
//! validation and duplicate resolution, in that order. The input table is
//! never modified; the result owns a new table.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::cleaning::{clean_cell, normalize_cell, CaseMode, NullTokens};
use super::mapping::ColumnMap;
use crate::error::TransformError;
use crate::logs::{log_info, log_success, log_warning};
use crate::models::{IssueKind, Table, ValidationIssue};
use crate::validation::{classify, Classification, CLIENT_MATTER_CODE};

/// What to do when two rows share a key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort at the first repeated key
    #[default]
    Error,
    /// Keep the first row for each key and drop the rest
    KeepFirst,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::Error => "error",
            DuplicatePolicy::KeepFirst => "keep-first",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(DuplicatePolicy::Error),
            "keep-first" | "keep_first" => Ok(DuplicatePolicy::KeepFirst),
            other => Err(format!(
                "unknown duplicate policy '{}' (expected keep-first or error)",
                other
            )),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the transformer needs besides the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformConfig {
    /// Columns to select, in output order
    pub mappings: ColumnMap,
    #[serde(default)]
    pub case_mode: CaseMode,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Key column, named after the mapping (destination name)
    #[serde(default = "default_key_column")]
    pub key_column: String,
    #[serde(default)]
    pub null_tokens: NullTokens,
    /// Fail when any key has a format problem
    #[serde(default)]
    pub strict: bool,
}

fn default_key_column() -> String {
    CLIENT_MATTER_CODE.to_string()
}

impl TransformConfig {
    pub fn new(mappings: ColumnMap) -> Self {
        Self {
            mappings,
            case_mode: CaseMode::default(),
            duplicate_policy: DuplicatePolicy::default(),
            key_column: default_key_column(),
            null_tokens: NullTokens::default(),
            strict: false,
        }
    }

    pub fn with_case(mut self, case_mode: CaseMode) -> Self {
        self.case_mode = case_mode;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }

    pub fn with_null_tokens(mut self, null_tokens: NullTokens) -> Self {
        self.null_tokens = null_tokens;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Result of a successful transformation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Surviving rows with cleaned values, columns in mapping order
    pub table: Table,
    /// Every row-level issue, in row order
    pub issues: Vec<ValidationIssue>,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows removed by duplicate resolution
    pub rows_dropped: usize,
}

impl TransformResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues_of(kind).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Transformed: {} rows in, {} rows out, {} duplicates dropped, {} issues",
            self.rows_in,
            self.rows_out,
            self.rows_dropped,
            self.issues.len()
        )
    }
}

/// Run the full transformation.
///
/// Configuration errors (unknown source column) are reported before any row
/// is cleaned. Under [`DuplicatePolicy::Error`] the first repeated key aborts
/// the run; every other row-level problem is collected in
/// [`TransformResult::issues`] unless `strict` is set. A table without data
/// rows yields an empty result.
pub fn transform(table: &Table, config: &TransformConfig) -> Result<TransformResult, TransformError> {
    let projected = config.mappings.apply(table)?;
    log_info(format!(
        "Selected {} of {} columns: {}",
        projected.column_count(),
        table.column_count(),
        projected.columns().join(", ")
    ));

    let key_idx = projected.column_index(&config.key_column);
    let cleaned: Vec<Vec<String>> = projected
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, cell)| {
                    if Some(col) == key_idx {
                        normalize_cell(cell.as_deref(), &config.null_tokens)
                    } else {
                        clean_cell(cell.as_deref(), &config.null_tokens, config.case_mode)
                    }
                })
                .collect()
        })
        .collect();
    log_info(format!(
        "Cleaned {} rows (case: {})",
        cleaned.len(),
        config.case_mode
    ));

    let mut keep = vec![true; cleaned.len()];
    let mut issues = Vec::new();

    match key_idx {
        None => log_warning(format!(
            "Key column '{}' is not among the selected columns; skipping key validation and duplicate checks",
            config.key_column
        )),
        Some(k) => {
            let mut seen: HashSet<&str> = HashSet::new();

            for (row_index, row) in cleaned.iter().enumerate() {
                let key = row[k].as_str();
                let raw = projected.rows()[row_index][k].as_deref().unwrap_or("");
                let class = classify(key);

                if let Some(kind) = IssueKind::from_classification(class) {
                    issues.push(ValidationIssue::new(row_index, &config.key_column, raw, kind));
                }
                // Null keys never collide with each other.
                if class == Classification::Null || seen.insert(key) {
                    continue;
                }

                match config.duplicate_policy {
                    DuplicatePolicy::Error => {
                        return Err(TransformError::DuplicateKey {
                            row_index,
                            key: key.to_string(),
                        });
                    }
                    DuplicatePolicy::KeepFirst => {
                        keep[row_index] = false;
                        issues.push(ValidationIssue::new(
                            row_index,
                            &config.key_column,
                            raw,
                            IssueKind::DuplicateKey,
                        ));
                    }
                }
            }
        }
    }

    if config.strict {
        let invalid: Vec<ValidationIssue> = issues
            .iter()
            .filter(|i| i.kind.is_format_issue())
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(TransformError::InvalidKeys(invalid));
        }
    }

    let rows_in = cleaned.len();
    let rows: Vec<_> = cleaned
        .into_iter()
        .zip(keep)
        .filter(|(_, kept)| *kept)
        .map(|(row, _)| row.into_iter().map(Some).collect())
        .collect();
    let rows_out = rows.len();
    let rows_dropped = rows_in - rows_out;

    if rows_dropped > 0 {
        log_success(format!("Removed {} duplicate rows", rows_dropped));
    }
    let format_issues = issues.iter().filter(|i| i.kind.is_format_issue()).count();
    if format_issues > 0 {
        log_warning(format!("{} key values failed validation", format_issues));
    }

    Ok(TransformResult {
        table: Table::from_parts(projected.columns().to_vec(), rows),
        issues,
        rows_in,
        rows_out,
        rows_dropped,
    })
}
