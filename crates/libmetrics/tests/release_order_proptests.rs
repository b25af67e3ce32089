//! Property tests for release-date ingestion

use libmetrics::config::SourceKind;
use libmetrics::ingest::{ingest_with, ErrorPolicy, Table};
use proptest::prelude::*;

fn date_text() -> impl Strategy<Value = String> {
    (1990i32..2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

fn tables_for(dates: &[String]) -> impl FnMut(SourceKind) -> Result<Table, libmetrics::IngestError> + '_ {
    move |kind| {
        let data = match kind {
            SourceKind::LibraryInfo => "Library,Repository,Domain\nLibA,r,Parsers\n".to_string(),
            SourceKind::ReleaseFrequency => {
                let mut data = String::from("LibA\n");
                for date in dates {
                    data.push_str(date);
                    data.push('\n');
                }
                data
            }
            SourceKind::BackwardsCompatibility => "Release,LibA\n".to_string(),
            _ => "Library\n".to_string(),
        };
        Table::from_reader(kind, data.as_bytes())
    }
}

proptest! {
    /// Property: release dates come out sorted and nothing is lost
    #[test]
    fn prop_release_dates_sorted(dates in prop::collection::vec(date_text(), 0..20)) {
        let ingestion = ingest_with(ErrorPolicy::Strict, tables_for(&dates)).unwrap();
        let library = &ingestion.domains[0].libraries[0];

        prop_assert_eq!(library.release_dates.len(), dates.len());
        prop_assert!(library.release_dates.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(ingestion.report.is_clean());
    }

    /// Property: duplicate dates are kept
    #[test]
    fn prop_duplicate_dates_kept(date in date_text(), copies in 1usize..5) {
        let dates = vec![date; copies];
        let ingestion = ingest_with(ErrorPolicy::Lenient, tables_for(&dates)).unwrap();

        prop_assert_eq!(ingestion.domains[0].libraries[0].release_dates.len(), copies);
    }
}
