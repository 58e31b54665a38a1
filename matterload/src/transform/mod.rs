//! Transformation module.
//!
//! - Mapping: column selection and renaming DSL
//! - Cleaning: trim, null normalization, case transforms
//! - Executor: key validation and duplicate resolution over a table
//! - Pipeline: file-level read, transform, write

pub mod cleaning;
pub mod executor;
pub mod mapping;
pub mod pipeline;

pub use cleaning::{clean_cell, normalize_cell, proper_case, CaseMode, NullTokens};
pub use executor::{transform, DuplicatePolicy, TransformConfig, TransformResult};
pub use mapping::{ColumnMap, ColumnMapping};
pub use pipeline::{
    profile_file, read_source, transform_file, write_report, SourceInfo, TransformOutcome,
    TransformReport,
};
