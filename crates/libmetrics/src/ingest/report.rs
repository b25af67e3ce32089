//! Per-record problems collected during an ingestion run.

use crate::config::SourceKind;
use crate::errors::IngestError;
use serde::Serialize;

/// Problems recorded while building the model, in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    problems: Vec<IngestError>,
}

/// Serializable view of one problem.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub code: &'static str,
    pub table: SourceKind,
    pub message: String,
}

impl IngestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, problem: IngestError) {
        self.problems.push(problem);
    }

    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[IngestError] {
        &self.problems
    }

    pub fn for_table(&self, table: SourceKind) -> impl Iterator<Item = &IngestError> {
        self.problems.iter().filter(move |p| p.table() == table)
    }

    /// Names of libraries that some table referenced but no domain contains.
    pub fn unmatched_names(&self) -> Vec<&str> {
        self.problems
            .iter()
            .filter_map(|p| match p {
                IngestError::CorrelationMiss { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.problems
            .iter()
            .map(|p| ReportEntry {
                code: p.code(),
                table: p.table(),
                message: p.to_string(),
            })
            .collect()
    }
}
