//! Per-domain metric views.
//!
//! Each view is recomputed from the model on every call, one row per library
//! in domain order. Views render as plain text for the terminal and serialize
//! for `--json`.

use crate::domain::queries::{issue_breakdown, popularity_series, releases_per_year, IssueBreakdown};
use crate::domain::{BreakingChange, Domain, LastDiscussion, Library};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// Widest bar drawn in the popularity view.
const BAR_WIDTH: u64 = 40;

/// The metric views a domain can be compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Popularity,
    Releases,
    Modification,
    Breaking,
    Discussion,
    Issues,
}

impl Metric {
    pub fn title(self) -> &'static str {
        match self {
            Metric::Popularity => "Popularity",
            Metric::Releases => "Release Frequency",
            Metric::Modification => "Last Modification Date",
            Metric::Breaking => "Backwards Compatibility",
            Metric::Discussion => "Stack Overflow Activity",
            Metric::Issues => "Issues",
        }
    }
}

/// One library's row in a metric view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricRow {
    Popularity {
        library: String,
        popularity: u64,
    },
    Releases {
        library: String,
        per_year: Vec<(i32, usize)>,
        latest: Option<NaiveDate>,
    },
    Modification {
        library: String,
        last_modified: Option<NaiveDate>,
    },
    Breaking {
        library: String,
        total: u64,
        releases: Vec<BreakingChange>,
    },
    Discussion {
        library: String,
        last_discussed: Option<LastDiscussion>,
        questions: u64,
    },
    Issues {
        library: String,
        #[serde(flatten)]
        breakdown: IssueBreakdown,
    },
}

/// Compute a metric view for every library of `domain`.
pub fn metric_rows(domain: &Domain, metric: Metric) -> Vec<MetricRow> {
    if metric == Metric::Popularity {
        return popularity_series(domain)
            .into_iter()
            .map(|(library, popularity)| MetricRow::Popularity {
                library: library.to_string(),
                popularity,
            })
            .collect();
    }

    domain
        .libraries
        .iter()
        .map(|library| library_row(library, metric))
        .collect()
}

fn library_row(library: &Library, metric: Metric) -> MetricRow {
    let name = library.name.clone();
    match metric {
        Metric::Popularity => MetricRow::Popularity {
            library: name,
            popularity: library.popularity,
        },
        Metric::Releases => MetricRow::Releases {
            library: name,
            per_year: releases_per_year(library),
            latest: library.latest_release(),
        },
        Metric::Modification => MetricRow::Modification {
            library: name,
            last_modified: library.last_modified,
        },
        Metric::Breaking => MetricRow::Breaking {
            library: name,
            total: library.total_breaking_changes(),
            releases: library.breaking_changes.clone(),
        },
        Metric::Discussion => MetricRow::Discussion {
            library: name,
            last_discussed: library.last_discussed,
            questions: library.questions_asked,
        },
        Metric::Issues => MetricRow::Issues {
            library: name,
            breakdown: issue_breakdown(library),
        },
    }
}

/// Render a metric view as aligned plain text.
///
/// # Example
/// ```
/// use libmetrics::domain::{Domain, Library};
/// use libmetrics::visualization::{render_metric, Metric};
///
/// let mut domain = Domain::new("HTTP Clients");
/// let mut lib = Library::new("Requests");
/// lib.popularity = 10;
/// domain.add_library(lib);
///
/// let text = render_metric(&domain, Metric::Popularity);
/// assert!(text.contains("Requests"));
/// ```
pub fn render_metric(domain: &Domain, metric: Metric) -> String {
    let rows = metric_rows(domain, metric);
    let width = domain
        .libraries
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);
    let max_popularity = domain.libraries.iter().map(|l| l.popularity).max().unwrap_or(0);

    let mut output = format!("{}: {}\n", domain.name, metric.title());

    for row in &rows {
        let line = match row {
            MetricRow::Popularity {
                library,
                popularity,
            } => format!(
                "  {:<width$}  {:>8}  {}",
                library,
                popularity,
                bar(*popularity, max_popularity)
            ),
            MetricRow::Releases {
                library,
                per_year,
                latest,
            } => {
                let years = if per_year.is_empty() {
                    "-".to_string()
                } else {
                    per_year
                        .iter()
                        .map(|(year, count)| format!("{}:{}", year, count))
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                format!(
                    "  {:<width$}  latest {}  {}",
                    library,
                    date_or_dash(*latest),
                    years
                )
            }
            MetricRow::Modification {
                library,
                last_modified,
            } => format!("  {:<width$}  {}", library, date_or_dash(*last_modified)),
            MetricRow::Breaking {
                library,
                total,
                releases,
            } => {
                let detail = releases
                    .iter()
                    .map(|b| format!("{}:{}", b.release, b.count))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("  {:<width$}  {:>5}  {}", library, total, detail)
            }
            MetricRow::Discussion {
                library,
                last_discussed,
                questions,
            } => {
                let last = match last_discussed {
                    Some(LastDiscussion::Never) => "never".to_string(),
                    Some(LastDiscussion::On(date)) => date.to_string(),
                    None => "-".to_string(),
                };
                format!("  {:<width$}  {:<10}  {:>7} questions", library, last, questions)
            }
            MetricRow::Issues { library, breakdown } => format!(
                "  {:<width$}  total {:>4}  perf {:>3}  sec {:>3}  generic {:>4}  open {:>4}  unanswered {:>4}",
                library,
                breakdown.total,
                breakdown.performance,
                breakdown.security,
                breakdown.generic,
                breakdown.open,
                breakdown.unanswered
            ),
        };
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = value.saturating_mul(BAR_WIDTH) / max;
    "#".repeat(len as usize)
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Issue;

    fn sample() -> Domain {
        let mut domain = Domain::new("HTTP Clients");

        let mut requests = Library::new("Requests");
        requests.popularity = 100;
        requests.release_dates = vec![
            NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        ];
        requests.last_discussed = Some(LastDiscussion::Never);
        requests.breaking_changes = vec![BreakingChange {
            release: "v2".to_string(),
            count: 4,
        }];
        let mut issue = Issue::new("1");
        issue.security = true;
        requests.issues.push(issue);

        let mut httpx = Library::new("httpx");
        httpx.popularity = 50;

        domain.add_library(requests);
        domain.add_library(httpx);
        domain
    }

    #[test]
    fn test_popularity_bars_scale_to_max() {
        let text = render_metric(&sample(), Metric::Popularity);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "HTTP Clients: Popularity");
        assert!(lines[1].ends_with(&"#".repeat(40)));
        assert!(lines[2].ends_with(&"#".repeat(20)));
        assert!(!lines[2].ends_with(&"#".repeat(21)));
    }

    #[test]
    fn test_every_metric_has_one_row_per_library() {
        let domain = sample();
        for metric in Metric::value_variants() {
            assert_eq!(metric_rows(&domain, *metric).len(), 2, "{:?}", metric);
            assert_eq!(render_metric(&domain, *metric).lines().count(), 3);
        }
    }

    #[test]
    fn test_missing_data_renders_as_dash() {
        let text = render_metric(&sample(), Metric::Modification);
        assert!(text.contains("httpx     -"));

        let text = render_metric(&sample(), Metric::Discussion);
        assert!(text.contains("never"));
    }

    #[test]
    fn test_releases_row_lists_years() {
        let rows = metric_rows(&sample(), Metric::Releases);
        assert_eq!(
            rows[0],
            MetricRow::Releases {
                library: "Requests".to_string(),
                per_year: vec![(2018, 1), (2019, 1)],
                latest: NaiveDate::from_ymd_opt(2019, 1, 1),
            }
        );
    }

    #[test]
    fn test_issue_row_serializes_flat_breakdown() {
        let rows = metric_rows(&sample(), Metric::Issues);
        let json = serde_json::to_value(&rows[0]).unwrap();

        assert_eq!(json["metric"], "issues");
        assert_eq!(json["library"], "Requests");
        assert_eq!(json["security"], 1);
        assert_eq!(json["generic"], 0);
    }
}
