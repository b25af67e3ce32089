//! Table ingestion pipeline.
//!
//! Reads the metric tables in a fixed order and builds the
//! Domain → Library → Issue graph:
//!
//! 1. Library Info (creates domains and libraries)
//! 2. Popularity
//! 3. Release Frequency (wide)
//! 4. Last Modification Date
//! 5. Backwards Compatibility (wide)
//! 6. Last Discussed on Stack Overflow
//! 7. Issue Data
//!
//! A missing table aborts the run. Per-record problems are collected into an
//! [`IngestReport`] returned with the partial model, unless
//! [`ErrorPolicy::Strict`] is selected, in which case the first malformed
//! record aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use libmetrics::config::TableLayout;
//! use libmetrics::ingest::{ErrorPolicy, Ingestor};
//!
//! let ingestion = Ingestor::new(TableLayout::new("TableData"))
//!     .with_policy(ErrorPolicy::Lenient)
//!     .run()
//!     .unwrap();
//!
//! for domain in &ingestion.domains {
//!     println!("{}: {} libraries", domain.name, domain.libraries.len());
//! }
//! ```

pub mod columns;
pub mod fields;
pub mod report;
mod steps;
pub mod table;

pub use columns::{resolve_column, ColumnMatch};
pub use report::{IngestReport, ReportEntry};
pub use table::{Table, TableRow};

use crate::config::{MetricsConfig, SourceKind, TableLayout};
use crate::domain::Domain;
use crate::errors::IngestError;
use std::path::Path;
use tracing::{info, warn};

/// What to do with a malformed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Skip the record, report it and keep going.
    #[default]
    Lenient,
    /// Abort the run on the first malformed record.
    Strict,
}

/// The finished model and everything that went wrong building it.
#[derive(Debug, Clone)]
pub struct Ingestion {
    /// Domains in first-seen order from the Library Info table.
    pub domains: Vec<Domain>,
    pub report: IngestReport,
}

/// Applies the error policy to each problem and keeps the report.
pub(crate) struct Recorder {
    policy: ErrorPolicy,
    pub(crate) report: IngestReport,
}

impl Recorder {
    pub(crate) fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            report: IngestReport::new(),
        }
    }

    pub(crate) fn record(&mut self, problem: IngestError) -> Result<(), IngestError> {
        if problem.is_fatal() || (self.policy == ErrorPolicy::Strict && problem.is_malformed()) {
            return Err(problem);
        }
        warn!(table = %problem.table(), code = problem.code(), "{}", problem);
        self.report.push(problem);
        Ok(())
    }
}

/// Configured ingestion run over one table layout.
#[derive(Debug, Clone)]
pub struct Ingestor {
    layout: TableLayout,
    policy: ErrorPolicy,
}

impl Ingestor {
    pub fn new(layout: TableLayout) -> Self {
        Self {
            layout,
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build an ingestor from `libmetrics.toml` in `data_dir`, if present.
    pub fn from_config(data_dir: &Path) -> anyhow::Result<Self> {
        let config = MetricsConfig::load(data_dir)?;
        let policy = if config.strict() {
            ErrorPolicy::Strict
        } else {
            ErrorPolicy::Lenient
        };
        Ok(Self::new(config.layout(data_dir)).with_policy(policy))
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Read every table from disk and build the model.
    pub fn run(&self) -> Result<Ingestion, IngestError> {
        info!(data_dir = %self.layout.data_dir.display(), "ingesting metric tables");
        ingest_with(self.policy, |kind| Table::read(kind, &self.layout.path(kind)))
    }
}

/// Build the model from tables supplied by `load`, called once per table in
/// ingestion order. Any error from `load` aborts the run.
pub fn ingest_with<F>(policy: ErrorPolicy, mut load: F) -> Result<Ingestion, IngestError>
where
    F: FnMut(SourceKind) -> Result<Table, IngestError>,
{
    let mut domains: Vec<Domain> = Vec::new();
    let mut recorder = Recorder::new(policy);

    for kind in SourceKind::ALL {
        let table = load(kind)?;

        for problem in table.unreadable.iter().cloned() {
            recorder.record(problem)?;
        }

        let applied = match kind {
            SourceKind::LibraryInfo => steps::library_info(&mut domains, &table, &mut recorder)?,
            SourceKind::Popularity => steps::popularity(&mut domains, &table, &mut recorder)?,
            SourceKind::ReleaseFrequency => {
                steps::release_frequency(&mut domains, &table, &mut recorder)?
            }
            SourceKind::LastModification => {
                steps::last_modification(&mut domains, &table, &mut recorder)?
            }
            SourceKind::BackwardsCompatibility => {
                steps::backwards_compatibility(&mut domains, &table, &mut recorder)?
            }
            SourceKind::StackOverflow => {
                steps::stack_overflow(&mut domains, &table, &mut recorder)?
            }
            SourceKind::Issues => steps::issues(&mut domains, &table, &mut recorder)?,
        };

        info!(table = %kind, rows = table.rows.len(), applied, "ingested table");
    }

    Ok(Ingestion {
        domains,
        report: recorder.report,
    })
}

/// Ingest the tables under `./TableData` with default file names.
pub fn parse_tables() -> Result<Ingestion, IngestError> {
    Ingestor::new(TableLayout::default()).run()
}
