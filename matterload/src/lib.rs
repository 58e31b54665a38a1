//! # Matterload - ClientMatterCode bulk upload preparation
//!
//! Matterload profiles CSV and Excel exports and reshapes them into clean
//! UTF-8 CSV files for bulk upload into a case-management system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ CSV / Excel │────▶│   Parser    │────▶│  Transform   │────▶│  UTF-8 CSV  │
//! │  (any enc)  │     │  (auto-enc) │     │ (map, clean, │     │  (writer)   │
//! └─────────────┘     └──────┬──────┘     │  validate)   │     └─────────────┘
//!                            │            └──────────────┘
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Profile   │
//!                     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use matterload::{transform, ColumnMap, DuplicatePolicy, Table, TransformConfig};
//!
//! let table = Table::from_rows(
//!     vec!["ID".into(), "Client".into()],
//!     vec![
//!         vec![Some("12345.67890".into()), Some(" acme ".into())],
//!         vec![Some("12345.67890".into()), Some("acme".into())],
//!     ],
//! )
//! .unwrap();
//!
//! let config = TransformConfig::new(ColumnMap::parse(["ID:ClientMatterCode", "Client"]).unwrap())
//!     .with_duplicates(DuplicatePolicy::KeepFirst);
//! let result = transform(&table, &config).unwrap();
//!
//! assert_eq!(result.rows_out, 1);
//! assert_eq!(result.table.get(0, "Client"), Some("acme"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Table and validation issue models
//! - [`parser`] - CSV and spreadsheet reading with auto-detection
//! - [`writer`] - CSV output
//! - [`validation`] - ClientMatterCode classification
//! - [`transform`] - Mapping DSL, cleaning, transformer and file pipeline
//! - [`profile`] - Data-quality profiling
//! - [`logs`] - Pipeline logging

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// I/O
pub mod parser;
pub mod writer;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Profiling
pub mod profile;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    MappingError, PipelineError, PipelineResult, ReadError, TableError, TransformError,
    WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, IssueKind, Table, ValidationIssue};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{classify, is_valid, Classification, CLIENT_MATTER_CODE};

// =============================================================================
// Re-exports - Parsing and writing
// =============================================================================

pub use parser::{read_file, ParseResult, SourceFormat};
pub use writer::{to_csv_string, write_csv};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    profile_file, transform, transform_file, write_report, CaseMode, ColumnMap, ColumnMapping,
    DuplicatePolicy, NullTokens, SourceInfo, TransformConfig, TransformOutcome, TransformResult,
};

// =============================================================================
// Re-exports - Profile
// =============================================================================

pub use profile::{format_profile, profile, ProfileOptions, ProfileReport};
