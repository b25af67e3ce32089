//! Library Metrics
//!
//! Ingests tabular metric data about software libraries (popularity, release
//! cadence, modification dates, breaking changes, Stack Overflow activity and
//! issue history) into an in-memory model grouped by domain.
//!
//! The model is built once by [`ingest`] and then only read by renderers.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod output;
pub mod visualization;

// Re-export commonly used types
pub use config::{SourceKind, TableLayout};
pub use domain::{Domain, Issue, LastDiscussion, Library};
pub use errors::IngestError;
pub use ingest::{parse_tables, ErrorPolicy, IngestReport, Ingestion, Ingestor};
pub use output::{ExitCode, JsonOutput};
