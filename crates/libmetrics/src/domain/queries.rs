//! Pure query operations over the domain collection.
//!
//! Lookups used during ingestion and the per-metric series the comparison
//! views are drawn from. Nothing here caches: every view recomputes from the
//! model on each call.

use crate::domain::{Domain, Library};
use chrono::Datelike;
use serde::Serialize;

/// Find a domain by exact name.
pub fn find_domain<'a>(domains: &'a [Domain], name: &str) -> Option<&'a Domain> {
    domains.iter().find(|d| d.name == name)
}

/// Find a library by name across all domains.
///
/// Domains are scanned in order and the first match wins.
pub fn find_library<'a>(domains: &'a [Domain], name: &str) -> Option<&'a Library> {
    domains.iter().find_map(|d| d.find_library(name))
}

/// Mutable variant of [`find_library`].
pub fn find_library_mut<'a>(domains: &'a mut [Domain], name: &str) -> Option<&'a mut Library> {
    domains.iter_mut().find_map(|d| d.find_library_mut(name))
}

pub fn library_count(domains: &[Domain]) -> usize {
    domains.iter().map(|d| d.libraries.len()).sum()
}

/// Popularity bars for a domain, in library order.
pub fn popularity_series(domain: &Domain) -> Vec<(&str, u64)> {
    domain
        .libraries
        .iter()
        .map(|l| (l.name.as_str(), l.popularity))
        .collect()
}

/// Number of releases per calendar year, ascending by year.
pub fn releases_per_year(library: &Library) -> Vec<(i32, usize)> {
    let mut years: Vec<(i32, usize)> = Vec::new();

    for date in &library.release_dates {
        let year = date.year();
        match years.iter_mut().find(|(y, _)| *y == year) {
            Some((_, count)) => *count += 1,
            None => years.push((year, 1)),
        }
    }

    years.sort_by_key(|(year, _)| *year);
    years
}

/// Issue counts by category for one library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueBreakdown {
    pub total: usize,
    pub performance: usize,
    pub security: usize,
    pub generic: usize,
    pub open: usize,
    pub unanswered: usize,
}

pub fn issue_breakdown(library: &Library) -> IssueBreakdown {
    library
        .issues
        .iter()
        .fold(IssueBreakdown::default(), |mut acc, issue| {
            acc.total += 1;
            if issue.performance {
                acc.performance += 1;
            }
            if issue.security {
                acc.security += 1;
            }
            if issue.is_generic() {
                acc.generic += 1;
            }
            if issue.is_open() {
                acc.open += 1;
            }
            if issue.first_response_at.is_none() {
                acc.unanswered += 1;
            }
            acc
        })
}
