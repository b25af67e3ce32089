//! Error taxonomy for table ingestion and actionable formatting for the CLI.
//!
//! [`IngestError`] covers everything that can go wrong while reading the
//! metric tables. Only [`IngestError::MissingSource`] is always fatal; the
//! rest are collected per record (see [`crate::ingest::IngestReport`]).
//!
//! [`ActionableError`] wraps a message with possible causes and remedies so
//! fatal failures tell the operator what to do next.

use crate::config::SourceKind;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning metric tables into the domain model.
///
/// `line` is the 1-based line in the source file; the header is line 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// A required table is absent or unreadable.
    #[error("{table} table could not be read from {}: {reason}", .path.display())]
    MissingSource {
        table: SourceKind,
        path: PathBuf,
        reason: String,
    },

    /// A record names a library that no domain contains.
    #[error("{table} line {line}: library \"{name}\" not initialised")]
    CorrelationMiss {
        table: SourceKind,
        line: usize,
        name: String,
    },

    /// The Library Info table lists a library under a second domain.
    #[error("{table} line {line}: library \"{name}\" already belongs to domain \"{existing}\", not \"{requested}\"")]
    DomainConflict {
        table: SourceKind,
        line: usize,
        name: String,
        existing: String,
        requested: String,
    },

    /// A date, timestamp or count could not be parsed.
    #[error("{table} line {line}: malformed {field} {value:?}: {reason}")]
    MalformedField {
        table: SourceKind,
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A narrow table row has the wrong number of fields.
    #[error("{table} line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        table: SourceKind,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The CSV reader could not decode a record.
    #[error("{table} line {line}: unreadable record: {reason}")]
    MalformedRecord {
        table: SourceKind,
        line: usize,
        reason: String,
    },

    /// No header column of a wide table mentions the library.
    #[error("{table}: no column header mentions library \"{name}\"")]
    UnmatchedColumn { table: SourceKind, name: String },

    /// A wide table column has data below its first empty cell.
    #[error("{table}: column for \"{name}\" ends at line {line} but has data further down; ignored")]
    InteriorGap {
        table: SourceKind,
        name: String,
        line: usize,
    },
}

impl IngestError {
    /// Whether the error aborts the run regardless of policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::MissingSource { .. })
    }

    /// Whether the error invalidates a record's content, as opposed to a
    /// correlation or layout mismatch. Strict ingestion aborts on these.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            IngestError::MalformedField { .. }
                | IngestError::FieldCount { .. }
                | IngestError::MalformedRecord { .. }
        )
    }

    pub fn table(&self) -> SourceKind {
        match self {
            IngestError::MissingSource { table, .. }
            | IngestError::CorrelationMiss { table, .. }
            | IngestError::DomainConflict { table, .. }
            | IngestError::MalformedField { table, .. }
            | IngestError::FieldCount { table, .. }
            | IngestError::MalformedRecord { table, .. }
            | IngestError::UnmatchedColumn { table, .. }
            | IngestError::InteriorGap { table, .. } => *table,
        }
    }

    /// Stable identifier used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::MissingSource { .. } => "MISSING_SOURCE",
            IngestError::CorrelationMiss { .. } => "CORRELATION_MISS",
            IngestError::DomainConflict { .. } => "DOMAIN_CONFLICT",
            IngestError::MalformedField { .. } => "MALFORMED_FIELD",
            IngestError::FieldCount { .. } => "FIELD_COUNT",
            IngestError::MalformedRecord { .. } => "MALFORMED_RECORD",
            IngestError::UnmatchedColumn { .. } => "UNMATCHED_COLUMN",
            IngestError::InteriorGap { .. } => "INTERIOR_GAP",
        }
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use libmetrics::errors::ActionableError;
///
/// let error = ActionableError::new("Domain 'Parsers' not found")
///     .with_cause("The domain name is case-sensitive")
///     .with_remedy("List domains: libmetrics domains");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("{}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Render a fatal ingestion error with the standard remediation.
pub fn ingest_failed(error: &IngestError) -> ActionableError {
    match error {
        IngestError::MissingSource { table, path, .. } => {
            ActionableError::new(error.to_string())
                .with_cause(format!(
                    "The {} table is not at {}",
                    table,
                    path.display()
                ))
                .with_cause("The data directory may be wrong")
                .with_cause("A [tables] entry in libmetrics.toml may name the wrong file")
                .with_remedy("Point at the table directory: libmetrics --data-dir <dir> ...")
                .with_remedy("Or set LIBMETRICS_DATA_DIR=<dir>")
        }
        _ => ActionableError::new(error.to_string())
            .with_cause("Strict mode aborts on the first malformed record")
            .with_remedy("Fix the record in the source table")
            .with_remedy("Run without --strict to skip bad records and list them: libmetrics check"),
    }
}

/// Helper to create unknown domain errors.
pub fn domain_not_found(name: &str, available: &[&str]) -> ActionableError {
    let mut error = ActionableError::new(format!("Domain '{}' not found", name))
        .with_cause("Domain names are case-sensitive");

    if !available.is_empty() {
        error = error.with_cause(format!("Known domains: {}", available.join(", ")));
    }

    error.with_remedy("List all domains: libmetrics domains")
}

/// Helper to create unknown library errors.
pub fn library_not_found(name: &str) -> ActionableError {
    ActionableError::new(format!("Library '{}' not found", name))
        .with_cause("Libraries only exist if the Library Info table lists them")
        .with_cause("Library names are case-sensitive")
        .with_remedy("List libraries of a domain: libmetrics show <domain>")
}
