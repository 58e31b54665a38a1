//! Error types for the matterload pipeline.
//!
//! The hierarchy mirrors the three failure classes of the tool:
//!
//! - configuration errors ([`MappingError`]) abort before any row is read
//! - I/O errors ([`ReadError`], [`WriteError`]) abort the run
//! - row-level errors ([`TransformError::DuplicateKey`], [`TransformError::InvalidKeys`])
//!   abort only under the policies that make them fatal
//!
//! [`PipelineError`] wraps everything for the CLI. Conversions are `From`
//! implementations so `?` works across module boundaries.

use thiserror::Error;

use crate::models::ValidationIssue;

// =============================================================================
// Table Errors
// =============================================================================

/// Structural violations of the rectangular table invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two columns share a name.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one cell per column.
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Read Errors
// =============================================================================

/// Errors while loading an input file into a table.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The path does not exist or cannot be opened.
    #[error("Cannot read file '{path}': {source}")]
    UnreadableFile {
        path: String,
        source: std::io::Error,
    },

    /// The extension is not one the reader understands.
    #[error("Unsupported file format: '{0}' (expected .csv, .tsv, .txt, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat(String),

    /// The bytes could not be decoded as text.
    #[error("Unable to detect file encoding: {0}")]
    EncodingDetectionFailed(String),

    /// Malformed CSV content.
    #[error("Failed to read CSV file: {0}")]
    ParseError(String),

    /// The spreadsheet could not be opened or has no worksheet.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// The file contains no header row.
    #[error("No headers found in file")]
    NoHeaders,

    /// The header row violates the table invariant.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Configuration errors in the column mapping DSL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A mapping spec is empty or whitespace-only.
    #[error("Column mapping cannot be empty")]
    EmptyMapping,

    /// A mapping spec contains more than one `:`.
    #[error("Invalid column mapping syntax: '{0}'. Expected format 'Source:Dest' or 'Name'")]
    InvalidMappingSyntax(String),

    /// The part before `:` is empty.
    #[error("Source column name cannot be empty in mapping '{0}'")]
    EmptySource(String),

    /// The part after `:` is empty.
    #[error("Destination column name cannot be empty in mapping '{0}'")]
    EmptyDestination(String),

    /// Two mappings produce the same output column.
    #[error("Duplicate destination column: '{0}'")]
    DuplicateDestination(String),

    /// A source column does not exist in the input table.
    #[error("Column '{0}' not found in source file")]
    UnknownSourceColumn(String),

    /// No mapping specs were supplied.
    #[error("No column mappings specified")]
    NoMappings,
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Fatal errors raised by the transformer.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Invalid mapping configuration.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The input table has no data rows.
    #[error("Input file contains no data rows")]
    EmptyInput,

    /// A key value was seen twice under the `error` duplicate policy.
    #[error("Duplicate value '{key}' found in key column at row {}", .row_index + 2)]
    DuplicateKey { row_index: usize, key: String },

    /// Key format issues were found in strict mode.
    #[error("Validation errors found:\n{}", format_issues(.0))]
    InvalidKeys(Vec<ValidationIssue>),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while emitting the output CSV.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Refused to write a table without columns.
    #[error("Cannot write an empty table to file")]
    EmptyTable,

    /// Filesystem failure.
    #[error("Error writing output file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// CSV serialization failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the file-level pipeline functions.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Mapping configuration is invalid.
    #[error("Configuration error: {0}")]
    Mapping(#[from] MappingError),

    /// Transformation aborted.
    #[error("Validation Error: {0}")]
    Transform(#[from] TransformError),

    /// Output could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// A JSON report could not be produced.
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    /// A report file could not be written.
    #[error("Cannot write report '{path}': {source}")]
    ReportIo {
        path: String,
        source: std::io::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
