//! Read-only data-quality profiling.
//!
//! [`profile`] never fails and never mutates the table: malformed or
//! duplicated keys are counted and listed, not rejected. Distinct and
//! duplicate counts are computed over raw cell values; nullness follows the
//! same rule as transform cleaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::{IssueKind, Table, ValidationIssue};
use crate::transform::NullTokens;
use crate::validation::{classify_cell, Classification, CLIENT_MATTER_CODE};

/// Options for [`profile`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptions {
    /// Key column to check. When unset, `ClientMatterCode` is used if the
    /// table has it.
    pub key_column: Option<String>,
    #[serde(default)]
    pub null_tokens: NullTokens,
}

impl ProfileOptions {
    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = Some(key_column.into());
        self
    }

    pub fn with_null_tokens(mut self, null_tokens: NullTokens) -> Self {
        self.null_tokens = null_tokens;
        self
    }
}

/// Per-column counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub name: String,
    pub null_count: usize,
    pub distinct_count: usize,
}

/// How many key values fell in each classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationTally {
    pub valid: usize,
    pub malformed_format: usize,
    pub likely_truncated: usize,
    pub null: usize,
}

impl ClassificationTally {
    pub fn record(&mut self, class: Classification) {
        match class {
            Classification::Valid => self.valid += 1,
            Classification::MalformedFormat => self.malformed_format += 1,
            Classification::LikelyTruncated => self.likely_truncated += 1,
            Classification::Null => self.null += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.malformed_format + self.likely_truncated + self.null
    }
}

/// Findings for the key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProfile {
    pub column: String,
    /// Distinct non-null values that occur more than once.
    pub duplicate_count: usize,
    /// Rows whose key repeats an earlier row.
    pub duplicate_rows: usize,
    /// Duplicated values in first-seen order.
    pub duplicated_values: Vec<String>,
    pub tally: ClassificationTally,
    /// Every row whose key is not valid, in row order.
    pub invalid_rows: Vec<ValidationIssue>,
}

impl KeyProfile {
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_count > 0
    }
}

/// Result of profiling a table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileReport {
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnStats>,
    pub key: Option<KeyProfile>,
    pub warnings: Vec<String>,
}

impl ProfileReport {
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_profile(self))
    }
}

/// Profile a table.
pub fn profile(table: &Table, options: &ProfileOptions) -> ProfileReport {
    let nulls = &options.null_tokens;

    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut null_count = 0;
            let mut distinct = HashSet::new();
            for cell in table.column_values(idx) {
                match cell {
                    Some(value) if !nulls.is_null(cell) => {
                        distinct.insert(value);
                    }
                    _ => null_count += 1,
                }
            }
            ColumnStats {
                name: name.clone(),
                null_count,
                distinct_count: distinct.len(),
            }
        })
        .collect();

    let mut warnings = Vec::new();
    let key_column = match &options.key_column {
        Some(name) if table.has_column(name) => Some(name.as_str()),
        Some(name) => {
            warnings.push(format!("Key column '{}' not found in file", name));
            None
        }
        None => table.has_column(CLIENT_MATTER_CODE).then_some(CLIENT_MATTER_CODE),
    };

    ProfileReport {
        generated_at: Utc::now(),
        row_count: table.row_count(),
        column_count: table.column_count(),
        columns,
        key: key_column.and_then(|name| profile_key(table, name, nulls)),
        warnings,
    }
}

fn profile_key(table: &Table, column: &str, nulls: &NullTokens) -> Option<KeyProfile> {
    let idx = table.column_index(column)?;

    let mut tally = ClassificationTally::default();
    let mut invalid_rows = Vec::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut first_seen = Vec::new();
    let mut duplicate_rows = 0;

    for (row_index, cell) in table.column_values(idx).enumerate() {
        let class = if nulls.is_null(cell) {
            Classification::Null
        } else {
            classify_cell(cell)
        };
        tally.record(class);
        if let Some(kind) = IssueKind::from_classification(class) {
            invalid_rows.push(ValidationIssue::new(
                row_index,
                column,
                cell.unwrap_or_default(),
                kind,
            ));
        }

        if let (Some(value), false) = (cell, class == Classification::Null) {
            let count = occurrences.entry(value).or_insert(0);
            if *count == 0 {
                first_seen.push(value);
            } else {
                duplicate_rows += 1;
            }
            *count += 1;
        }
    }

    let duplicated_values: Vec<String> = first_seen
        .into_iter()
        .filter(|v| occurrences.get(v).is_some_and(|&n| n > 1))
        .map(str::to_string)
        .collect();

    Some(KeyProfile {
        column: column.to_string(),
        duplicate_count: duplicated_values.len(),
        duplicate_rows,
        duplicated_values,
        tally,
        invalid_rows,
    })
}

/// Render a report as human-readable text.
pub fn format_profile(report: &ProfileReport) -> String {
    let mut out = String::new();
    out.push_str("File Profile\n");
    out.push_str("============\n");
    out.push_str(&format!("Rows: {}\n", report.row_count));
    out.push_str(&format!("Columns: {}\n\n", report.column_count));

    out.push_str("Column Statistics:\n");
    for column in &report.columns {
        out.push_str(&format!("{}:\n", column.name));
        out.push_str(&format!("  Unique Values: {}\n", column.distinct_count));
        out.push_str(&format!("  Missing Values: {}\n\n", column.null_count));
    }

    if let Some(key) = &report.key {
        if key.has_duplicates() {
            out.push_str(&format!("Duplicates found on {}:\n", key.column));
            out.push_str(&format!("  Count: {}\n", key.duplicate_count));
            out.push_str(&format!("  Duplicate rows: {}\n", key.duplicate_rows));
            out.push_str(&format!("  Values: {}\n\n", key.duplicated_values.join(", ")));
        }

        out.push_str(&format!("Key Validation ({}):\n", key.column));
        out.push_str(&format!("  Valid: {}\n", key.tally.valid));
        out.push_str(&format!("  Malformed format: {}\n", key.tally.malformed_format));
        out.push_str(&format!("  Likely truncated: {}\n", key.tally.likely_truncated));
        out.push_str(&format!("  Null: {}\n", key.tally.null));

        if !key.invalid_rows.is_empty() {
            out.push_str("\nValidation Errors:\n");
            for issue in &key.invalid_rows {
                out.push_str(&format!("  {}\n", issue));
            }
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  {}\n", warning));
        }
    }

    out
}
