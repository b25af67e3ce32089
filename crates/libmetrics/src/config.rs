//! Table layout and configuration file loading.
//!
//! The metric tables live in a single data directory (`TableData/` by
//! default). An optional `libmetrics.toml` inside that directory can rename
//! individual tables and select strict ingestion. If no config file exists,
//! the defaults apply.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "LIBMETRICS_DATA_DIR";

/// Data directory used when neither flag nor environment names one.
pub const DEFAULT_DATA_DIR: &str = "TableData";

/// Name of the optional configuration file inside the data directory.
pub const CONFIG_FILE: &str = "libmetrics.toml";

/// One of the metric tables, in the order they are ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LibraryInfo,
    Popularity,
    ReleaseFrequency,
    LastModification,
    BackwardsCompatibility,
    StackOverflow,
    Issues,
}

impl SourceKind {
    /// All tables in ingestion order.
    pub const ALL: [SourceKind; 7] = [
        SourceKind::LibraryInfo,
        SourceKind::Popularity,
        SourceKind::ReleaseFrequency,
        SourceKind::LastModification,
        SourceKind::BackwardsCompatibility,
        SourceKind::StackOverflow,
        SourceKind::Issues,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SourceKind::LibraryInfo => "Library Info",
            SourceKind::Popularity => "Popularity",
            SourceKind::ReleaseFrequency => "Release Frequency",
            SourceKind::LastModification => "Last Modification Date",
            SourceKind::BackwardsCompatibility => "Backwards Compatibility",
            SourceKind::StackOverflow => "Last Discussed on Stack Overflow",
            SourceKind::Issues => "Issue Data",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("Metric Data - {}.csv", self.title())
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Where each table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub data_dir: PathBuf,
    files: HashMap<SourceKind, String>,
}

impl TableLayout {
    /// Layout with default file names under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            files: HashMap::new(),
        }
    }

    /// Override the file name of one table.
    pub fn with_file(mut self, kind: SourceKind, file: impl Into<String>) -> Self {
        self.files.insert(kind, file.into());
        self
    }

    pub fn file_name(&self, kind: SourceKind) -> String {
        self.files
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_file_name())
    }

    pub fn path(&self, kind: SourceKind) -> PathBuf {
        self.data_dir.join(self.file_name(kind))
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// Root configuration structure loaded from `libmetrics.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Table file name overrides (optional).
    pub tables: Option<TablesConfig>,
    /// Ingestion behavior (optional).
    pub ingest: Option<IngestConfig>,
}

/// File name overrides, relative to the data directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesConfig {
    pub library_info: Option<String>,
    pub popularity: Option<String>,
    pub release_frequency: Option<String>,
    pub last_modification: Option<String>,
    pub backwards_compatibility: Option<String>,
    pub stack_overflow: Option<String>,
    pub issues: Option<String>,
}

impl TablesConfig {
    fn get(&self, kind: SourceKind) -> Option<&String> {
        match kind {
            SourceKind::LibraryInfo => self.library_info.as_ref(),
            SourceKind::Popularity => self.popularity.as_ref(),
            SourceKind::ReleaseFrequency => self.release_frequency.as_ref(),
            SourceKind::LastModification => self.last_modification.as_ref(),
            SourceKind::BackwardsCompatibility => self.backwards_compatibility.as_ref(),
            SourceKind::StackOverflow => self.stack_overflow.as_ref(),
            SourceKind::Issues => self.issues.as_ref(),
        }
    }
}

/// Ingestion behavior configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    /// Abort on the first malformed record (default: false).
    pub strict: Option<bool>,
}

impl MetricsConfig {
    /// Load configuration from `<data_dir>/libmetrics.toml` if it exists.
    ///
    /// Returns an empty config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(MetricsConfig::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: MetricsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Table layout for `data_dir` with any configured overrides applied.
    pub fn layout(&self, data_dir: &Path) -> TableLayout {
        let mut layout = TableLayout::new(data_dir);
        if let Some(tables) = &self.tables {
            for kind in SourceKind::ALL {
                if let Some(file) = tables.get(kind) {
                    layout = layout.with_file(kind, file.clone());
                }
            }
        }
        layout
    }

    pub fn strict(&self) -> bool {
        self.ingest
            .as_ref()
            .and_then(|i| i.strict)
            .unwrap_or(false)
    }
}

/// Resolve the data directory: explicit flag, then environment, then default.
///
/// Relative paths are taken relative to `current_dir`.
pub fn resolve_data_dir(flag: Option<&Path>, current_dir: &Path) -> PathBuf {
    let chosen = match flag {
        Some(dir) => dir.to_path_buf(),
        None => std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    };
    current_dir.join(chosen)
}
