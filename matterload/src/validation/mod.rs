//! ClientMatterCode validation.
//!
//! A ClientMatterCode is five ASCII digits, a period, and five ASCII digits
//! (`DDDDD.DDDDD`). Values are classified rather than accepted or rejected,
//! because a truncated code (Excel dropping trailing zeros from something it
//! took for a number) needs a different fix than a mistyped one:
//!
//! | Value           | Classification    |
//! |-----------------|-------------------|
//! | `12345.67890`   | `Valid`           |
//! | `12345.1`       | `LikelyTruncated` |
//! | `1234.56789`    | `MalformedFormat` |
//! | `""` / `"   "`  | `Null`            |
//!
//! # Example
//!
//! ```rust
//! use matterload::validation::{classify, Classification};
//!
//! assert_eq!(classify("12345.67890"), Classification::Valid);
//! assert_eq!(classify("12345.1"), Classification::LikelyTruncated);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default name of the key column.
pub const CLIENT_MATTER_CODE: &str = "ClientMatterCode";

// `\d` would accept any Unicode digit, so the classes are spelled out.
static VALID_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}\.[0-9]{5}$").expect("valid code pattern"));
static TRUNCATED_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]{1,4}$").expect("truncation pattern"));
static SHORT_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,4}\.[0-9]+$").expect("short integer pattern"));

/// Outcome of checking one value against the ClientMatterCode rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Valid,
    Null,
    MalformedFormat,
    LikelyTruncated,
}

/// Classify a value. Total: every string maps to exactly one variant.
pub fn classify(value: &str) -> Classification {
    let value = value.trim();

    if value.is_empty() {
        Classification::Null
    } else if VALID_CODE.is_match(value) {
        Classification::Valid
    } else if TRUNCATED_FRACTION.is_match(value) {
        Classification::LikelyTruncated
    } else {
        Classification::MalformedFormat
    }
}

/// Classify a cell, treating a null marker like an empty string.
pub fn classify_cell(cell: Option<&str>) -> Classification {
    cell.map_or(Classification::Null, classify)
}

pub fn is_valid(value: &str) -> bool {
    classify(value) == Classification::Valid
}

/// Explain why a value is not a valid code, `None` when it is valid.
pub fn describe(value: &str) -> Option<&'static str> {
    let trimmed = value.trim();
    match classify(trimmed) {
        Classification::Valid => None,
        Classification::Null => Some("client matter code is empty"),
        Classification::LikelyTruncated => Some("possible truncation - fractional part too short"),
        Classification::MalformedFormat if SHORT_INTEGER.is_match(trimmed) => {
            Some("invalid format - integer part too short")
        }
        Classification::MalformedFormat if !trimmed.contains('.') => {
            Some("invalid format - missing period")
        }
        Classification::MalformedFormat => Some("invalid format - expected DDDDD.DDDDD"),
    }
}
