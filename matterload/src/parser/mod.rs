//! File reading with encoding and delimiter auto-detection.
//!
//! Produces a [`Table`] of verbatim string cells: nothing is trimmed, recased
//! or typed here. Empty fields become null markers.
//!
//! - CSV-like files (`.csv`, `.tsv`, `.txt`): byte-order mark, then UTF-8,
//!   then `chardet`; the delimiter is detected from the header line.
//! - Spreadsheets (`.xlsx`, `.xlsm`, `.xls`, `.ods`): first worksheet via
//!   `calamine`, first row as header.

use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde::Serialize;
use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::logs::log_warning;
use crate::models::{Cell, Table};

/// Kind of source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Pick the reader from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> ReadResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(ReadError::UnsupportedFormat(format!(".{}", extension))),
        }
    }
}

/// Result of reading a file, with what was detected along the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    pub format: SourceFormat,
    /// Detected text encoding (CSV only)
    pub encoding: Option<String>,
    /// Detected or forced delimiter (CSV only)
    pub delimiter: Option<char>,
}

/// Read a CSV or spreadsheet file into a table.
pub fn read_file<P: AsRef<Path>>(path: P) -> ReadResult<ParseResult> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)?;

    if !path.is_file() {
        return Err(ReadError::UnreadableFile {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    match format {
        SourceFormat::Csv => {
            let bytes = std::fs::read(path).map_err(|source| ReadError::UnreadableFile {
                path: path.display().to_string(),
                source,
            })?;
            let is_tsv = path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            parse_bytes_auto(&bytes, is_tsv.then_some('\t'))
        }
        SourceFormat::Spreadsheet => Ok(ParseResult {
            table: read_spreadsheet(path)?,
            format,
            encoding: None,
            delimiter: None,
        }),
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes.
///
/// A byte-order mark wins, then strict UTF-8, then `chardet`. Content with
/// NUL bytes and no byte-order mark is rejected as binary.
pub fn detect_encoding(bytes: &[u8]) -> ReadResult<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(encoding);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Ok(UTF_8);
    }
    if bytes.contains(&0) {
        return Err(ReadError::EncodingDetectionFailed(
            "file looks like binary data".to_string(),
        ));
    }

    let (charset, confidence, _) = chardet::detect(bytes);
    let label = match charset.to_lowercase().as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "windows-1252".to_string(),
        "ascii" => "utf-8".to_string(),
        other => other.to_string(),
    };

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding)
            if encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .is_some() =>
        {
            Ok(encoding)
        }
        _ => {
            log_warning(format!(
                "Unrecognized encoding '{}' (confidence {:.2}), falling back to windows-1252",
                charset, confidence
            ));
            Ok(WINDOWS_1252)
        }
    }
}

/// Decode bytes with the given encoding, stripping any byte-order mark.
pub fn decode_content(bytes: &[u8], encoding: &'static Encoding) -> ReadResult<String> {
    let (content, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ReadError::EncodingDetectionFailed(format!(
            "content is not valid {}",
            used.name()
        )));
    }
    Ok(content.into_owned())
}

// =============================================================================
// CSV
// =============================================================================

const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Detect the delimiter by counting occurrences in the first line.
///
/// Ties go to the earlier candidate in `, ; \t |`; a line with none of them
/// is read as comma-separated.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode and parse CSV bytes, detecting whatever is not forced.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> ReadResult<ParseResult> {
    let encoding = detect_encoding(bytes)?;
    let content = decode_content(bytes, encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    Ok(ParseResult {
        table: parse_csv_str(&content, delimiter)?,
        format: SourceFormat::Csv,
        encoding: Some(encoding.name().to_string()),
        delimiter: Some(delimiter),
    })
}

/// Parse decoded CSV text with an explicit delimiter.
///
/// # Example
/// ```rust
/// use matterload::parser::parse_csv_str;
///
/// let table = parse_csv_str("name;age\nAlice;30\nBob;", ';').unwrap();
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.get(0, "age"), Some("30"));
/// assert_eq!(table.get(1, "age"), None);
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> ReadResult<Table> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| ReadError::ParseError(format!("unsupported delimiter '{}'", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| ReadError::ParseError(e.to_string()))?
        .clone();
    if header.is_empty() || (header.len() == 1 && header[0].trim().is_empty()) {
        return Err(ReadError::NoHeaders);
    }

    let mut table = Table::new(header_names(header.iter()))?;
    let width = table.column_count();

    for record in reader.records() {
        let record = record.map_err(|e| ReadError::ParseError(e.to_string()))?;
        let row: Vec<Cell> = (0..width)
            .map(|i| record.get(i).filter(|v| !v.is_empty()).map(str::to_string))
            .collect();
        table.push_row(row)?;
    }

    Ok(table)
}

/// Header names with blanks replaced by `Unnamed: N`.
fn header_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .enumerate()
        .map(|(i, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.to_string()
            }
        })
        .collect()
}

// =============================================================================
// Spreadsheets
// =============================================================================

fn cell_text(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        other => Some(other.to_string()).filter(|s| !s.is_empty()),
    }
}

/// Read the first worksheet of a spreadsheet.
pub fn read_spreadsheet(path: &Path) -> ReadResult<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReadError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReadError::Spreadsheet(format!("{}: no worksheet found", path.display())))?
        .map_err(|e| ReadError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(ReadError::NoHeaders)?;
    let header_text: Vec<String> = header
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();
    if header_text.iter().all(|h| h.trim().is_empty()) {
        return Err(ReadError::NoHeaders);
    }

    let mut table = Table::new(header_names(header_text.iter().map(String::as_str)))?;
    let width = table.column_count();

    for row in rows {
        let cells: Vec<Cell> = (0..width)
            .map(|i| row.get(i).and_then(cell_text))
            .collect();
        table.push_row(cells)?;
    }

    Ok(table)
}
