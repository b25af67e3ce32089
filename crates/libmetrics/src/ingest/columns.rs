//! Column resolution for wide tables.
//!
//! The release-frequency and backwards-compatibility tables have one column
//! per library, identified only by the library's name appearing somewhere in
//! the header text. Resolution is kept separate from row walking so the
//! tie-break rule can be tested on its own.

use crate::ingest::table::{Table, TableRow};

/// Which header wins when several contain the library name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch {
    First,
    Last,
}

/// Index of the header column whose text contains `name`.
///
/// An empty name never matches.
pub fn resolve_column(header: &[String], name: &str, rule: ColumnMatch) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut matches = header
        .iter()
        .enumerate()
        .filter(|(_, text)| text.contains(name))
        .map(|(idx, _)| idx);

    match rule {
        ColumnMatch::First => matches.next(),
        ColumnMatch::Last => matches.last(),
    }
}

/// Cells of one column read top to bottom up to the first empty cell.
#[derive(Debug)]
pub struct ColumnRun<'a> {
    pub cells: Vec<(&'a TableRow, &'a str)>,
    /// Line of the first empty cell when non-empty cells follow it.
    pub gap_at: Option<usize>,
}

/// Walk `column` from the top and stop at the first empty cell.
pub fn contiguous_cells(table: &Table, column: usize) -> ColumnRun<'_> {
    let mut cells = Vec::new();
    let mut gap_at = None;

    let mut rows = table.rows.iter();
    for row in rows.by_ref() {
        let cell = row.cell(column);
        if cell.is_empty() {
            gap_at = Some(row.line);
            break;
        }
        cells.push((row, cell));
    }

    let has_more = rows.any(|row| !row.cell(column).is_empty());
    if !has_more {
        gap_at = None;
    }

    ColumnRun { cells, gap_at }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn table(data: &str) -> Table {
        Table::from_reader(SourceKind::ReleaseFrequency, data.as_bytes()).unwrap()
    }

    #[test]
    fn test_substring_match_ignores_extra_header_text() {
        let h = header(&["Release", "LibA-x", "LibB"]);

        assert_eq!(resolve_column(&h, "LibA", ColumnMatch::First), Some(1));
        assert_eq!(resolve_column(&h, "LibB", ColumnMatch::First), Some(2));
        assert_eq!(resolve_column(&h, "LibC", ColumnMatch::First), None);
    }

    #[test]
    fn test_empty_name_matches_no_column() {
        let h = header(&["A", "B"]);

        assert_eq!(resolve_column(&h, "", ColumnMatch::First), None);
        assert_eq!(resolve_column(&h, "", ColumnMatch::Last), None);
    }

    #[test]
    fn test_tie_break_first_versus_last() {
        let h = header(&["Release", "Lib releases", "Lib (mirror)", "Other"]);

        assert_eq!(resolve_column(&h, "Lib", ColumnMatch::First), Some(1));
        assert_eq!(resolve_column(&h, "Lib", ColumnMatch::Last), Some(2));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let h = header(&["requests"]);
        assert_eq!(resolve_column(&h, "Requests", ColumnMatch::Last), None);
    }

    #[test]
    fn test_contiguous_cells_stop_at_trailing_empty() {
        let t = table("A,B\n2019-01-01,2018-01-01\n2019-02-01,\n,\n");

        let run = contiguous_cells(&t, 1);
        assert_eq!(run.cells.len(), 1);
        assert_eq!(run.cells[0].1, "2018-01-01");
        assert_eq!(run.gap_at, None);

        let run = contiguous_cells(&t, 0);
        assert_eq!(run.cells.len(), 2);
        assert_eq!(run.gap_at, None);
    }

    #[test]
    fn test_contiguous_cells_flag_interior_gap() {
        let t = table("A\n2019-01-01\n\"\"\n2019-03-01\n");

        let run = contiguous_cells(&t, 0);
        assert_eq!(run.cells.len(), 1);
        assert_eq!(run.gap_at, Some(3));
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let t = table("A,B\nx\n");

        let run = contiguous_cells(&t, 1);
        assert!(run.cells.is_empty());
        assert_eq!(run.gap_at, None);
    }
}
