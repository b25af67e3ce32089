//! Per-table ingestion steps.
//!
//! Each step applies one buffered table to the domain collection and returns
//! how many values it applied. Only [`library_info`] may create domains or
//! libraries; every other step correlates by name and reports misses.

use super::columns::{contiguous_cells, resolve_column, ColumnMatch};
use super::fields::{
    parse_count, parse_date, parse_discussion, parse_flag, parse_timestamp, FieldError,
};
use super::table::{Table, TableRow};
use super::Recorder;
use crate::config::SourceKind;
use crate::domain::queries::find_library_mut;
use crate::domain::{BreakingChange, Domain, Issue, Library};
use crate::errors::IngestError;
use tracing::debug;

/// Split a narrow-table row into exactly `N` fields, reporting any mismatch.
fn fields<'r, const N: usize>(
    row: &'r TableRow,
    table: SourceKind,
    rec: &mut Recorder,
) -> Result<Option<[&'r str; N]>, IngestError> {
    if row.cells.len() != N {
        rec.record(IngestError::FieldCount {
            table,
            line: row.line,
            expected: N,
            found: row.cells.len(),
        })?;
        return Ok(None);
    }
    Ok(Some(std::array::from_fn(|i| row.cells[i].as_str())))
}

fn parse_field<T>(
    table: SourceKind,
    row: &TableRow,
    field: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Result<T, FieldError>,
) -> Result<T, IngestError> {
    parse(value).map_err(|e| IngestError::MalformedField {
        table,
        line: row.line,
        field,
        value: value.to_string(),
        reason: e.0,
    })
}

/// Look up a library across all domains, reporting a miss.
fn correlate<'d>(
    domains: &'d mut [Domain],
    table: SourceKind,
    row: &TableRow,
    name: &str,
    rec: &mut Recorder,
) -> Result<Option<&'d mut Library>, IngestError> {
    match find_library_mut(domains, name) {
        Some(library) => Ok(Some(library)),
        None => {
            rec.record(IngestError::CorrelationMiss {
                table,
                line: row.line,
                name: name.to_string(),
            })?;
            Ok(None)
        }
    }
}

/// `name, repository, domain` per row. Creates domains and libraries in
/// first-seen order and overwrites the repository on repeats.
pub(super) fn library_info(
    domains: &mut Vec<Domain>,
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for row in &table.rows {
        let Some([name, repository, domain_name]) = fields::<3>(row, table.kind, rec)? else {
            continue;
        };

        let blank = [("library name", name), ("domain name", domain_name)]
            .into_iter()
            .find(|(_, value)| value.is_empty());
        if let Some((field, value)) = blank {
            rec.record(IngestError::MalformedField {
                table: table.kind,
                line: row.line,
                field,
                value: value.to_string(),
                reason: "must not be empty".to_string(),
            })?;
            continue;
        }

        let idx = match domains.iter().position(|d| d.name == domain_name) {
            Some(idx) => idx,
            None => {
                domains.push(Domain::new(domain_name));
                domains.len() - 1
            }
        };

        let elsewhere = domains
            .iter()
            .find(|d| d.name != domain_name && d.find_library(name).is_some())
            .map(|d| d.name.clone());

        if let Some(existing) = elsewhere {
            rec.record(IngestError::DomainConflict {
                table: table.kind,
                line: row.line,
                name: name.to_string(),
                existing,
                requested: domain_name.to_string(),
            })?;
            // The library stays in its first domain but still takes the latest repository.
            if let Some(library) = find_library_mut(domains, name) {
                library.repository = repository.to_string();
                applied += 1;
            }
            continue;
        }

        domains[idx].library_entry(name).repository = repository.to_string();
        applied += 1;
    }

    Ok(applied)
}

/// `name, count` per row.
pub(super) fn popularity(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for row in &table.rows {
        let Some([name, count]) = fields::<2>(row, table.kind, rec)? else {
            continue;
        };
        let Some(library) = correlate(domains, table.kind, row, name, rec)? else {
            continue;
        };

        match parse_field(table.kind, row, "popularity count", count, parse_count::<u64>) {
            Ok(count) => {
                library.popularity = count;
                applied += 1;
            }
            Err(problem) => rec.record(problem)?,
        }
    }

    Ok(applied)
}

/// Wide table of release dates; the last header mentioning a library wins.
pub(super) fn release_frequency(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for domain in domains.iter_mut() {
        for library in domain.libraries.iter_mut() {
            let Some(column) = resolve_column(&table.header, &library.name, ColumnMatch::Last)
            else {
                rec.record(IngestError::UnmatchedColumn {
                    table: table.kind,
                    name: library.name.clone(),
                })?;
                continue;
            };
            debug!(table = %table.kind, library = %library.name, column, "resolved column");

            let run = contiguous_cells(table, column);
            for (row, cell) in run.cells {
                match parse_field(table.kind, row, "release date", cell, parse_date) {
                    Ok(date) => {
                        library.release_dates.push(date);
                        applied += 1;
                    }
                    Err(problem) => rec.record(problem)?,
                }
            }

            if let Some(line) = run.gap_at {
                rec.record(IngestError::InteriorGap {
                    table: table.kind,
                    name: library.name.clone(),
                    line,
                })?;
            }

            library.release_dates.sort();
        }
    }

    Ok(applied)
}

/// `name, date` per row.
pub(super) fn last_modification(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for row in &table.rows {
        let Some([name, date]) = fields::<2>(row, table.kind, rec)? else {
            continue;
        };
        let Some(library) = correlate(domains, table.kind, row, name, rec)? else {
            continue;
        };

        match parse_field(table.kind, row, "modification date", date, parse_date) {
            Ok(date) => {
                library.last_modified = Some(date);
                applied += 1;
            }
            Err(problem) => rec.record(problem)?,
        }
    }

    Ok(applied)
}

/// Wide table of breaking-change counts; column 0 names the release and the
/// first header mentioning a library wins.
pub(super) fn backwards_compatibility(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for domain in domains.iter_mut() {
        for library in domain.libraries.iter_mut() {
            let Some(column) = resolve_column(&table.header, &library.name, ColumnMatch::First)
            else {
                rec.record(IngestError::UnmatchedColumn {
                    table: table.kind,
                    name: library.name.clone(),
                })?;
                continue;
            };
            debug!(table = %table.kind, library = %library.name, column, "resolved column");

            let run = contiguous_cells(table, column);
            for (row, cell) in run.cells {
                match parse_field(table.kind, row, "breaking change count", cell, parse_count::<u32>) {
                    Ok(count) => {
                        library.breaking_changes.push(BreakingChange {
                            release: row.cell(0).to_string(),
                            count,
                        });
                        applied += 1;
                    }
                    Err(problem) => rec.record(problem)?,
                }
            }

            if let Some(line) = run.gap_at {
                rec.record(IngestError::InteriorGap {
                    table: table.kind,
                    name: library.name.clone(),
                    line,
                })?;
            }
        }
    }

    Ok(applied)
}

/// `name, last discussed, question count` per row.
pub(super) fn stack_overflow(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for row in &table.rows {
        let Some([name, last_discussed, questions]) = fields::<3>(row, table.kind, rec)? else {
            continue;
        };
        let Some(library) = correlate(domains, table.kind, row, name, rec)? else {
            continue;
        };

        let parsed = parse_field(
            table.kind,
            row,
            "last discussed date",
            last_discussed,
            parse_discussion,
        )
        .and_then(|discussion| {
            parse_field(table.kind, row, "question count", questions, parse_count::<u64>)
                .map(|count| (discussion, count))
        });

        match parsed {
            Ok((discussion, count)) => {
                library.last_discussed = Some(discussion);
                library.questions_asked = count;
                applied += 1;
            }
            Err(problem) => rec.record(problem)?,
        }
    }

    Ok(applied)
}

/// `id, library, created, closed, first comment, performance, security` per row.
pub(super) fn issues(
    domains: &mut [Domain],
    table: &Table,
    rec: &mut Recorder,
) -> Result<usize, IngestError> {
    let mut applied = 0;

    for row in &table.rows {
        let Some(cells) = fields::<7>(row, table.kind, rec)? else {
            continue;
        };
        let Some(library) = correlate(domains, table.kind, row, cells[1], rec)? else {
            continue;
        };

        match issue_from_row(table.kind, row, cells) {
            Ok(issue) => {
                library.issues.push(issue);
                applied += 1;
            }
            Err(problem) => rec.record(problem)?,
        }
    }

    Ok(applied)
}

fn issue_from_row(
    table: SourceKind,
    row: &TableRow,
    [id, _library, created, closed, first_comment, performance, security]: [&str; 7],
) -> Result<Issue, IngestError> {
    let mut issue = Issue::new(id);
    issue.created_at = parse_field(table, row, "creation timestamp", created, parse_timestamp)?;
    issue.closed_at = parse_field(table, row, "closing timestamp", closed, parse_timestamp)?;
    issue.first_response_at = parse_field(
        table,
        row,
        "first comment timestamp",
        first_comment,
        parse_timestamp,
    )?;
    issue.performance = parse_flag(performance);
    issue.security = parse_flag(security);
    Ok(issue)
}
