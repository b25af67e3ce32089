//! Command-line interface definitions using clap.

use crate::visualization::Metric;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Library metrics explorer
///
/// Reads the metric tables (library info, popularity, releases, modification
/// dates, backwards compatibility, Stack Overflow activity, issues) and shows
/// them grouped by domain.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Table, domain or library not found
///   4  - Ingestion recorded problems (check) or strict mode aborted
///  10  - File system failure
#[derive(Parser)]
#[command(name = "libmetrics")]
#[command(about = "Compare software libraries by domain from metric tables", long_about = None)]
pub struct Cli {
    /// Directory holding the metric tables (default: $LIBMETRICS_DATA_DIR or ./TableData)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Abort on the first malformed record instead of skipping it
    #[arg(long, global = true)]
    pub strict: bool,

    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Log each table as it is ingested
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List domains and how many libraries each holds
    Domains,

    /// Show one metric view for every library in a domain
    Show {
        /// Domain name (exact)
        domain: String,

        /// Metric to show
        #[arg(short, long, value_enum, default_value_t = Metric::Popularity)]
        metric: Metric,
    },

    /// Show every field of one library
    Library {
        /// Library name (exact)
        name: String,
    },

    /// Ingest the tables and list every recorded problem
    Check,

    /// Export the full model as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
