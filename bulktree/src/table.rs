//! CSV table loading.
//!
//! Turns a comma-separated table with a header row into `(key, row)`
//! records, keyed by one named column. Cells are split on `,` and trimmed;
//! quoting is not supported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Key read from the index column.
///
/// Integers order numerically and before all text keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnKey {
    Integer(i64),
    Text(String),
}

impl ColumnKey {
    /// Parse a cell as an integer, falling back to text.
    #[must_use]
    pub fn parse(cell: &str) -> Self {
        cell.parse::<i64>()
            .map_or_else(|_| Self::Text(cell.to_string()), Self::Integer)
    }
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

/// One data row of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the source.
    pub line: usize,
    /// Cells in header order.
    pub cells: Vec<String>,
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cells.join(", "))
    }
}

/// Errors that can occur when loading a table.
#[derive(Debug)]
pub enum TableError {
    /// Reading the source failed.
    Io(std::io::Error),
    /// The source has no header row.
    EmptyTable,
    /// The header has no column with this name.
    MissingColumn(String),
    /// A row's cell count differs from the header's.
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::EmptyTable => write!(f, "table has no header row"),
            Self::MissingColumn(name) => write!(f, "table has no column named '{name}'"),
            Self::RaggedRow {
                line,
                expected,
                found,
            } => write!(f, "line {line} has {found} cells, expected {expected}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TableError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Load `(key, row)` records from the CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a well-formed
/// table with a column named `index_column`.
pub fn load_records(path: &Path, index_column: &str) -> Result<Vec<(ColumnKey, Row)>, TableError> {
    let file = File::open(path)?;
    parse_records(BufReader::new(file), index_column)
}

/// Parse `(key, row)` records from CSV text.
///
/// Blank lines are skipped. Records come back in file order.
///
/// # Errors
///
/// Same as [`load_records`].
pub fn parse_records<R: BufRead>(
    reader: R,
    index_column: &str,
) -> Result<Vec<(ColumnKey, Row)>, TableError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|text| (i + 1, text)));

    let header = loop {
        match lines.next().transpose()? {
            Some((_, text)) if text.trim().is_empty() => {}
            Some((_, text)) => break split_cells(&text),
            None => return Err(TableError::EmptyTable),
        }
    };

    let key_index = header
        .iter()
        .position(|name| name == index_column)
        .ok_or_else(|| TableError::MissingColumn(index_column.to_string()))?;

    let mut records = Vec::new();
    for item in lines {
        let (line, text) = item?;
        if text.trim().is_empty() {
            continue;
        }
        let cells = split_cells(&text);
        if cells.len() != header.len() {
            return Err(TableError::RaggedRow {
                line,
                expected: header.len(),
                found: cells.len(),
            });
        }
        let key = ColumnKey::parse(&cells[key_index]);
        records.push((key, Row { line, cells }));
    }

    tracing::debug!(
        rows = records.len(),
        columns = header.len(),
        index_column,
        "parsed table"
    );
    Ok(records)
}

fn split_cells(text: &str) -> Vec<String> {
    text.split(',').map(|cell| cell.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use tempfile::tempdir;

    use super::*;

    const PEOPLE: &str = "id,name,age\n3,carol,41\n1,alice,30\n\n2,bob,25\n";

    #[test]
    fn test_parse_records() {
        let records = parse_records(Cursor::new(PEOPLE), "id").expect("parse");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].0, ColumnKey::Integer(3));
        assert_eq!(records[0].1.cells, vec!["3", "carol", "41"]);
        assert_eq!(records[0].1.line, 2);
        // The blank line still counts toward line numbers
        assert_eq!(records[2].1.line, 5);
    }

    #[test]
    fn test_parse_text_keys() {
        let records = parse_records(Cursor::new(PEOPLE), "name").expect("parse");
        let keys: Vec<ColumnKey> = records.into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                ColumnKey::Text("carol".to_string()),
                ColumnKey::Text("alice".to_string()),
                ColumnKey::Text("bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_column_key_ordering() {
        assert!(ColumnKey::Integer(-5) < ColumnKey::Integer(2));
        assert!(ColumnKey::Integer(i64::MAX) < ColumnKey::Text(String::new()));
        assert!(ColumnKey::parse("apple") < ColumnKey::parse("banana"));
        assert_eq!(ColumnKey::parse(" 7"), ColumnKey::Text(" 7".to_string()));
        assert_eq!(ColumnKey::parse("-12"), ColumnKey::Integer(-12));
        assert_eq!(ColumnKey::Integer(42).to_string(), "42");
    }

    #[test]
    fn test_missing_column() {
        let err = parse_records(Cursor::new(PEOPLE), "email").expect_err("missing column");
        assert!(matches!(err, TableError::MissingColumn(ref name) if name == "email"));
        assert_eq!(err.to_string(), "table has no column named 'email'");
    }

    #[test]
    fn test_empty_table() {
        let err = parse_records(Cursor::new("\n\n"), "id").expect_err("empty");
        assert!(matches!(err, TableError::EmptyTable));
    }

    #[test]
    fn test_header_only_table() {
        let records = parse_records(Cursor::new("id,name\n"), "id").expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn test_ragged_row() {
        let err = parse_records(Cursor::new("id,name\n1,a\n2\n"), "id").expect_err("ragged");
        assert!(matches!(
            err,
            TableError::RaggedRow {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("people.csv");
        let mut file = File::create(&path).expect("create file");
        file.write_all(PEOPLE.as_bytes()).expect("write file");
        drop(file);

        let records = load_records(&path, "id").expect("load");
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].1.to_string(), "1, alice, 30");
    }

    #[test]
    fn test_load_records_missing_file() {
        let dir = tempdir().expect("create temp dir");
        let err = load_records(&dir.path().join("nope.csv"), "id").expect_err("missing file");
        assert!(matches!(err, TableError::Io(_)));
    }
}
