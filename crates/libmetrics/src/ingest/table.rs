//! Buffered CSV tables.
//!
//! Every source is read completely before it is applied to the model. Wide
//! tables need random access by column, and narrow tables are small enough
//! that streaming buys nothing.

use crate::config::SourceKind;
use crate::errors::IngestError;
use std::fs::File;
use std::io;
use std::path::Path;

/// One data row with the file line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: usize,
    pub cells: Vec<String>,
}

impl TableRow {
    /// Cell at `column`, or `""` when the row is too short.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// A fully buffered source table.
#[derive(Debug, Clone)]
pub struct Table {
    pub kind: SourceKind,
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Records the CSV reader could not decode.
    pub unreadable: Vec<IngestError>,
}

impl Table {
    /// Read a table from disk. A missing or unreadable file is fatal.
    pub fn read(kind: SourceKind, path: &Path) -> Result<Self, IngestError> {
        let missing = |reason: String| IngestError::MissingSource {
            table: kind,
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| missing(e.to_string()))?;
        Self::from_reader(kind, file).map_err(|e| match e {
            IngestError::MissingSource { reason, .. } => missing(reason),
            other => other,
        })
    }

    /// Read a table from any reader. The first line is always the header.
    pub fn from_reader<R: io::Read>(kind: SourceKind, reader: R) -> Result<Self, IngestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header = match csv_reader.headers() {
            Ok(record) => record.iter().map(str::to_string).collect(),
            Err(e) => return Err(Self::classify(kind, 1, e)),
        };

        let mut rows = Vec::new();
        let mut unreadable = Vec::new();

        for (idx, result) in csv_reader.records().enumerate() {
            let fallback_line = idx + 2;
            match result {
                Ok(record) => {
                    let line = record
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    rows.push(TableRow {
                        line,
                        cells: record.iter().map(str::to_string).collect(),
                    });
                }
                Err(e) => {
                    let line = e
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    match Self::classify(kind, line, e) {
                        fatal @ IngestError::MissingSource { .. } => return Err(fatal),
                        problem => unreadable.push(problem),
                    }
                }
            }
        }

        Ok(Self {
            kind,
            header,
            rows,
            unreadable,
        })
    }

    /// I/O failures make the whole table unreadable; anything else is
    /// confined to the record.
    fn classify(kind: SourceKind, line: usize, error: csv::Error) -> IngestError {
        match error.kind() {
            csv::ErrorKind::Io(io_error) => IngestError::MissingSource {
                table: kind,
                path: Default::default(),
                reason: io_error.to_string(),
            },
            _ => IngestError::MalformedRecord {
                table: kind,
                line,
                reason: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_header_is_kept_and_rows_carry_lines() {
        let data = "Name,Count\nRequests,10\nhttpx,3\n";
        let table = Table::from_reader(SourceKind::Popularity, data.as_bytes()).unwrap();

        assert_eq!(table.header, vec!["Name", "Count"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 3);
        assert_eq!(table.rows[1].cells, vec!["httpx", "3"]);
        assert!(table.unreadable.is_empty());
    }

    #[test]
    fn test_cells_are_trimmed_and_rows_may_be_ragged() {
        let data = "A,B,C\n 2019-01-01 , x\n";
        let table = Table::from_reader(SourceKind::ReleaseFrequency, data.as_bytes()).unwrap();

        let row = &table.rows[0];
        assert_eq!(row.cell(0), "2019-01-01");
        assert_eq!(row.cell(1), "x");
        assert_eq!(row.cell(2), "");
        assert_eq!(row.cell(9), "");
    }

    #[test]
    fn test_invalid_utf8_record_is_reported_not_fatal() {
        let mut data = b"Name,Count\n".to_vec();
        data.extend_from_slice(b"Bad\xff,1\n");
        data.extend_from_slice(b"Good,2\n");

        let table = Table::from_reader(SourceKind::Popularity, data.as_slice()).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells[0], "Good");
        assert_eq!(table.unreadable.len(), 1);
        assert!(table.unreadable[0].is_malformed());
    }

    #[test]
    fn test_missing_file_is_missing_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.csv");

        let err = Table::read(SourceKind::Issues, &path).unwrap_err();

        assert!(err.is_fatal());
        match err {
            IngestError::MissingSource { table, path: p, .. } => {
                assert_eq!(table, SourceKind::Issues);
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_has_no_rows() {
        let table = Table::from_reader(SourceKind::Popularity, "".as_bytes()).unwrap();
        assert!(table.header.is_empty());
        assert!(table.rows.is_empty());
    }
}
