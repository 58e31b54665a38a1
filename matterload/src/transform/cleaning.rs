//! Cell-level cleaning operations.
//!
//! Every projected cell is trimmed and null-normalized; non-key cells are
//! additionally case-transformed according to [`CaseMode`]. All operations
//! are idempotent.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Case transformation applied to non-key text cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Leave values as they are
    #[default]
    None,
    /// UPPER CASE
    Upper,
    /// lower case
    Lower,
    /// Capitalize each whitespace-separated word
    Proper,
}

impl CaseMode {
    pub fn apply(self, value: &str) -> String {
        match self {
            CaseMode::None => value.to_string(),
            CaseMode::Upper => value.to_uppercase(),
            CaseMode::Lower => value.to_lowercase(),
            CaseMode::Proper => proper_case(value),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CaseMode::None => "none",
            CaseMode::Upper => "upper",
            CaseMode::Lower => "lower",
            CaseMode::Proper => "proper",
        }
    }
}

impl FromStr for CaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CaseMode::None),
            "upper" => Ok(CaseMode::Upper),
            "lower" => Ok(CaseMode::Lower),
            "proper" => Ok(CaseMode::Proper),
            other => Err(format!(
                "unknown case mode '{}' (expected upper, lower, proper or none)",
                other
            )),
        }
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capitalize the first character of each whitespace-separated token and
/// lowercase the rest. Punctuation is not a token boundary, and the
/// whitespace between tokens is kept as is.
///
/// When uppercasing expands a character (`ß` -> `SS`), only the first
/// character of the expansion stays uppercase.
pub fn proper_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut token_start = true;

    for c in value.chars() {
        if c.is_whitespace() {
            out.push(c);
            token_start = true;
        } else if token_start {
            let mut upper = c.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
            token_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Tokens that stand for "no value" in source exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NullTokens(Vec<String>);

const DEFAULT_NULL_TOKENS: &[&str] = &["NULL", "N/A", "NA", "#N/A", "NaN", "None"];

impl NullTokens {
    /// Use exactly these tokens. Blank values are null regardless.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            tokens
                .into_iter()
                .map(|t| t.into().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Only blank values are null.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Whether a cell would be normalized to the empty string.
    ///
    /// Tokens match case-insensitively, otherwise a case transform could turn
    /// a value into a token (`na` -> `NA`) and cleaning would not be idempotent.
    pub fn is_null(&self, cell: Option<&str>) -> bool {
        match cell {
            None => true,
            Some(value) => {
                let trimmed = value.trim();
                trimmed.is_empty() || self.0.iter().any(|t| t.eq_ignore_ascii_case(trimmed))
            }
        }
    }
}

impl Default for NullTokens {
    fn default() -> Self {
        Self::new(DEFAULT_NULL_TOKENS.iter().copied())
    }
}

/// Trim and null-normalize a cell.
pub fn normalize_cell(cell: Option<&str>, nulls: &NullTokens) -> String {
    if nulls.is_null(cell) {
        String::new()
    } else {
        cell.map(str::trim).unwrap_or_default().to_string()
    }
}

/// Full cleaning of one cell: normalize, then apply the case mode.
pub fn clean_cell(cell: Option<&str>, nulls: &NullTokens, case: CaseMode) -> String {
    let normalized = normalize_cell(cell, nulls);
    match case {
        CaseMode::None => normalized,
        _ => case.apply(&normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_modes() {
        assert_eq!(CaseMode::Upper.apply("alice smith"), "ALICE SMITH");
        assert_eq!(CaseMode::Lower.apply("ALICE Smith"), "alice smith");
        assert_eq!(CaseMode::Proper.apply("aLICE sMITH"), "Alice Smith");
        assert_eq!(CaseMode::None.apply("aLiCe"), "aLiCe");
    }

    #[test]
    fn test_proper_case_only_splits_on_whitespace() {
        assert_eq!(proper_case("mary-jane o'neil"), "Mary-jane O'neil");
        assert_eq!(proper_case("BOB"), "Bob");
        assert_eq!(proper_case("two  spaces\tand tab"), "Two  Spaces\tAnd Tab");
        assert_eq!(proper_case("élodie ÉCOLE"), "Élodie École");
        assert_eq!(proper_case(""), "");
    }

    #[test]
    fn test_proper_case_expanding_uppercase() {
        assert_eq!(proper_case("\u{fb01}ona smith"), "Fiona Smith");
        assert_eq!(proper_case("\u{df}a"), "Ssa");
    }

    #[test]
    fn test_case_mode_from_str() {
        assert_eq!("Proper".parse::<CaseMode>(), Ok(CaseMode::Proper));
        assert_eq!("none".parse::<CaseMode>(), Ok(CaseMode::None));
        assert!("title".parse::<CaseMode>().is_err());
        assert_eq!(CaseMode::Upper.to_string(), "upper");
    }

    #[test]
    fn test_null_normalization() {
        let nulls = NullTokens::default();
        assert_eq!(normalize_cell(None, &nulls), "");
        assert_eq!(normalize_cell(Some(""), &nulls), "");
        assert_eq!(normalize_cell(Some("   "), &nulls), "");
        assert_eq!(normalize_cell(Some(" NULL "), &nulls), "");
        assert_eq!(normalize_cell(Some("N/A"), &nulls), "");
        assert_eq!(normalize_cell(Some(" Alice "), &nulls), "Alice");
        assert_eq!(normalize_cell(Some("nan"), &nulls), "");
        assert_eq!(normalize_cell(Some("NONE"), &nulls), "");
        // Whole-value matches only
        assert_eq!(normalize_cell(Some("Null Island"), &nulls), "Null Island");
        assert_eq!(normalize_cell(Some("Nancy"), &nulls), "Nancy");
    }

    #[test]
    fn test_custom_null_tokens() {
        let nulls = NullTokens::new(["-", " missing "]);
        assert_eq!(nulls.tokens(), ["-", "missing"]);
        assert!(nulls.is_null(Some("missing")));
        assert!(nulls.is_null(Some(" - ")));
        assert!(!nulls.is_null(Some("NULL")));

        let blank_only = NullTokens::none();
        assert!(blank_only.is_null(Some("  ")));
        assert!(!blank_only.is_null(Some("N/A")));
    }

    #[test]
    fn test_clean_cell_is_idempotent() {
        let nulls = NullTokens::default();
        let samples = [
            None,
            Some(""),
            Some("  alice  "),
            Some("BOB jones"),
            Some("NULL"),
            Some("  mixed\tCASE  words "),
            Some("o'brien-smith"),
            Some("na"),
            Some("n/a "),
            Some("\u{fb01}ona smith"),
            Some("\u{df}a"),
        ];
        for case in [CaseMode::None, CaseMode::Upper, CaseMode::Lower, CaseMode::Proper] {
            for cell in samples {
                let once = clean_cell(cell, &nulls, case);
                let twice = clean_cell(Some(once.as_str()), &nulls, case);
                assert_eq!(once, twice, "case {:?}, cell {:?}", case, cell);
            }
        }
    }

    #[test]
    fn test_case_applied_after_trim() {
        let nulls = NullTokens::default();
        assert_eq!(clean_cell(Some(" alice "), &nulls, CaseMode::Proper), "Alice");
        assert_eq!(clean_cell(Some("  "), &nulls, CaseMode::Upper), "");
    }
}
