//! Core data structures for the library metrics model.
//!
//! A [`Domain`] owns its [`Library`] records and each library owns its
//! [`Issue`] records. Nothing here knows about tables or charts; ingestion
//! fills these in and renderers only read them.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A named category grouping libraries that solve the same problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub libraries: Vec<Library>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            libraries: Vec::new(),
        }
    }

    /// Append a library. Callers are responsible for name uniqueness;
    /// use [`Domain::library_entry`] when the name may already exist.
    pub fn add_library(&mut self, library: Library) {
        self.libraries.push(library);
    }

    /// Find a library by exact name (linear scan).
    pub fn find_library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name == name)
    }

    /// Mutable variant of [`Domain::find_library`].
    pub fn find_library_mut(&mut self, name: &str) -> Option<&mut Library> {
        self.libraries.iter_mut().find(|l| l.name == name)
    }

    /// Return the library with this name, appending a fresh one if absent.
    pub fn library_entry(&mut self, name: &str) -> &mut Library {
        let idx = match self.libraries.iter().position(|l| l.name == name) {
            Some(idx) => idx,
            None => {
                self.libraries.push(Library::new(name));
                self.libraries.len() - 1
            }
        };
        &mut self.libraries[idx]
    }
}

/// When a library was last discussed on Stack Overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "date")]
pub enum LastDiscussion {
    /// The source explicitly records that no question was ever asked.
    Never,
    On(NaiveDate),
}

/// Breaking changes counted for one release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    pub release: String,
    pub count: u32,
}

/// One library under study with every metric gathered from the tables.
///
/// Fields left at their defaults mean the corresponding table had no data for
/// this library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub repository: String,
    pub popularity: u64,
    /// Sorted ascending once ingestion of the release table completes.
    pub release_dates: Vec<NaiveDate>,
    pub last_modified: Option<NaiveDate>,
    /// In table row order.
    pub breaking_changes: Vec<BreakingChange>,
    pub last_discussed: Option<LastDiscussion>,
    pub questions_asked: u64,
    pub issues: Vec<Issue>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: String::new(),
            popularity: 0,
            release_dates: Vec::new(),
            last_modified: None,
            breaking_changes: Vec::new(),
            last_discussed: None,
            questions_asked: 0,
            issues: Vec::new(),
        }
    }

    pub fn latest_release(&self) -> Option<NaiveDate> {
        self.release_dates.last().copied()
    }

    pub fn total_breaking_changes(&self) -> u64 {
        self.breaking_changes.iter().map(|b| u64::from(b.count)).sum()
    }
}

/// One tracked issue for a library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub created_at: Option<NaiveDateTime>,
    /// `None` while the issue is still open.
    pub closed_at: Option<NaiveDateTime>,
    /// `None` when nobody has responded.
    pub first_response_at: Option<NaiveDateTime>,
    pub performance: bool,
    pub security: bool,
}

impl Issue {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            closed_at: None,
            first_response_at: None,
            performance: false,
            security: false,
        }
    }

    /// An issue carrying neither the performance nor the security flag.
    pub fn is_generic(&self) -> bool {
        !self.performance && !self.security
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Time from creation to the first response, when both are known.
    pub fn first_response_delay(&self) -> Option<Duration> {
        match (self.created_at, self.first_response_at) {
            (Some(created), Some(responded)) => Some(responded.signed_duration_since(created)),
            _ => None,
        }
    }
}
