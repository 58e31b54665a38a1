//! Domain models for the matterload pipeline.
//!
//! - [`Table`] - rectangular table of string-or-null cells with named columns
//! - [`ValidationIssue`] - one problem found for one cell of the key column
//! - [`IssueKind`] - the category of a [`ValidationIssue`]

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::TableError;
use crate::validation::{self, Classification};

/// A single cell: a string value or an explicit null marker.
pub type Cell = Option<String>;

/// Offset between a 0-based data-row index and the spreadsheet line number
/// (1-based, plus the header line).
pub const HEADER_OFFSET: usize = 2;

// =============================================================================
// Table
// =============================================================================

/// In-memory table of string cells.
///
/// Every row holds exactly one cell per column; constructors reject anything
/// else. Values are never typed: numbers and dates stay as the text the
/// reader produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table and fill it with rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Build a table from parts the caller already knows are consistent.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Append a row, checking its width.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column (case-sensitive exact match).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of one cell, `None` for a null cell or unknown coordinates.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row[idx].as_deref())
    }
}

// =============================================================================
// Validation Issues
// =============================================================================

/// Category of a row-level problem on the key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedFormat,
    LikelyTruncated,
    DuplicateKey,
    NullKey,
}

impl IssueKind {
    /// Issue raised for a key classification, `None` for valid keys.
    pub fn from_classification(class: Classification) -> Option<Self> {
        match class {
            Classification::Valid => None,
            Classification::Null => Some(Self::NullKey),
            Classification::MalformedFormat => Some(Self::MalformedFormat),
            Classification::LikelyTruncated => Some(Self::LikelyTruncated),
        }
    }

    /// Whether the issue concerns the format of the value rather than its uniqueness.
    pub fn is_format_issue(self) -> bool {
        !matches!(self, Self::DuplicateKey)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MalformedFormat => "malformed format",
            Self::LikelyTruncated => "likely truncated",
            Self::DuplicateKey => "duplicate key",
            Self::NullKey => "null key",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One problem found for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// 0-based index of the row in the input table.
    pub row_index: usize,
    pub column: String,
    /// The cell as read, before cleaning (empty for a null cell).
    pub raw_value: String,
    pub kind: IssueKind,
    /// Human-readable explanation.
    pub detail: String,
}

impl ValidationIssue {
    pub fn new(row_index: usize, column: &str, raw_value: &str, kind: IssueKind) -> Self {
        let detail = match kind {
            IssueKind::DuplicateKey => "duplicate key value".to_string(),
            IssueKind::NullKey => "key value is empty".to_string(),
            IssueKind::MalformedFormat | IssueKind::LikelyTruncated => {
                validation::describe(raw_value)
                    .unwrap_or_else(|| kind.label())
                    .to_string()
            }
        };
        Self {
            row_index,
            column: column.to_string(),
            raw_value: raw_value.to_string(),
            kind,
            detail,
        }
    }

    /// Line number in the source file (header is line 1).
    pub fn row_number(&self) -> usize {
        self.row_index + HEADER_OFFSET
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row {}: '{}' - {}",
            self.row_number(),
            self.raw_value,
            self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::new(cols(&["Name", "Name"])).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("Name".into()));
    }

    #[test]
    fn test_row_width_checked() {
        let mut table = Table::new(cols(&["a", "b"])).unwrap();
        table
            .push_row(vec![Some("1".into()), None])
            .unwrap();
        let err = table.push_row(vec![Some("1".into())]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_cell_access() {
        let table = Table::from_rows(
            cols(&["Name", "Code"]),
            vec![
                vec![Some("Alice".into()), Some("12345.67890".into())],
                vec![Some("Bob".into()), None],
            ],
        )
        .unwrap();

        assert_eq!(table.get(0, "Name"), Some("Alice"));
        assert_eq!(table.get(1, "Code"), None);
        assert_eq!(table.get(5, "Name"), None);
        assert_eq!(table.get(0, "name"), None);
        let codes: Vec<_> = table.column_values(1).collect();
        assert_eq!(codes, vec![Some("12345.67890"), None]);
    }

    #[test]
    fn test_issue_display_uses_row_number() {
        let issue = ValidationIssue::new(0, "ClientMatterCode", "12345.1", IssueKind::LikelyTruncated);
        assert_eq!(issue.row_number(), 2);
        let msg = issue.to_string();
        assert!(msg.starts_with("Row 2: '12345.1'"));
        assert!(msg.contains("truncation"));
    }
}
