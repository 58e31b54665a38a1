//! CSV output.
//!
//! Output is always UTF-8, comma-separated, `\n`-terminated, with a header
//! row. Null cells are written as empty fields.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{WriteError, WriteResult};
use crate::models::Table;

fn csv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink)
}

fn write_table<W: Write>(table: &Table, sink: W) -> WriteResult<()> {
    if table.column_count() == 0 {
        return Err(WriteError::EmptyTable);
    }

    let mut writer = csv_writer(sink);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Render a table as CSV text.
///
/// # Example
/// ```rust
/// use matterload::models::Table;
/// use matterload::writer::to_csv_string;
///
/// let table = Table::from_rows(
///     vec!["Name".into(), "Note".into()],
///     vec![vec![Some("Smith, J".into()), None]],
/// )
/// .unwrap();
/// assert_eq!(to_csv_string(&table).unwrap(), "Name,Note\n\"Smith, J\",\n");
/// ```
pub fn to_csv_string(table: &Table) -> WriteResult<String> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    // Cells are Rust strings, so the buffer is UTF-8 by construction.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write a table to a file, creating parent directories as needed.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> WriteResult<()> {
    let path = path.as_ref();
    let io_error = |source| WriteError::Io {
        path: path.display().to_string(),
        source,
    };

    if table.column_count() == 0 {
        return Err(WriteError::EmptyTable);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = fs::File::create(path).map_err(io_error)?;
    write_table(table, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    fn sample() -> Table {
        Table::from_rows(
            vec!["ClientMatterCode".into(), "Name".into()],
            vec![
                vec![Some("12345.67890".into()), Some("Alice".into())],
                vec![Some("11111.22222".into()), None],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_to_csv_string() {
        let csv = to_csv_string(&sample()).unwrap();
        assert_eq!(csv, "ClientMatterCode,Name\n12345.67890,Alice\n11111.22222,\n");
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::new(vec!["A".into(), "B".into()]).unwrap();
        assert_eq!(to_csv_string(&table).unwrap(), "A,B\n");
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = Table::default();
        assert!(matches!(to_csv_string(&table), Err(WriteError::EmptyTable)));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_csv(&table, dir.path().join("out.csv")),
            Err(WriteError::EmptyTable)
        ));
    }

    #[test]
    fn test_quoting_survives_reparse() {
        let table = Table::from_rows(
            vec!["Name".into()],
            vec![vec![Some("O'Brien, \"Bob\"\nJr".into())]],
        )
        .unwrap();
        let csv = to_csv_string(&table).unwrap();
        let back = parse_csv_str(&csv, ',').unwrap();
        assert_eq!(back.get(0, "Name"), Some("O'Brien, \"Bob\"\nJr"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.csv");

        write_csv(&sample(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("ClientMatterCode,Name\n"));
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn test_non_ascii_is_utf8() {
        let table = Table::from_rows(vec!["Name".into()], vec![vec![Some("José".into())]]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, "Name\nJosé\n".as_bytes());
    }
}
