//! Coercion of loosely formatted text cells into typed values.
//!
//! Sentinel strings ("None", "Never", "Yes") are resolved here and never
//! reach the domain model.

use crate::domain::LastDiscussion;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Marks an absent timestamp in the issue table.
pub const NONE_MARKER: &str = "None";
/// Marks a library that was never discussed on Stack Overflow.
pub const NEVER_MARKER: &str = "Never";
/// The only text that sets an issue flag.
pub const YES_MARKER: &str = "Yes";

/// Why a cell could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FieldError(pub String);

/// Parse `year-month-day`.
pub fn parse_date(text: &str) -> Result<NaiveDate, FieldError> {
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != 3 {
        return Err(FieldError(format!(
            "expected year-month-day, found {} component(s)",
            parts.len()
        )));
    }

    let year = parse_component::<i32>(parts[0], "year")?;
    let month = parse_component::<u32>(parts[1], "month")?;
    let day = parse_component::<u32>(parts[2], "day")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| FieldError(format!("{}-{}-{} is not a calendar date", year, month, day)))
}

/// Parse `year-month-day hour:minute:second`, or `None` for the absent marker.
///
/// The space and colon separators are normalised to hyphens and the result
/// must split into exactly six integer components.
pub fn parse_timestamp(text: &str) -> Result<Option<NaiveDateTime>, FieldError> {
    if text == NONE_MARKER {
        return Ok(None);
    }

    let normalised = text.replace([' ', ':'], "-");
    let parts: Vec<&str> = normalised.split('-').collect();
    if parts.len() != 6 {
        return Err(FieldError(format!(
            "expected year-month-day hour:minute:second, found {} component(s)",
            parts.len()
        )));
    }

    let year = parse_component::<i32>(parts[0], "year")?;
    let month = parse_component::<u32>(parts[1], "month")?;
    let day = parse_component::<u32>(parts[2], "day")?;
    let hour = parse_component::<u32>(parts[3], "hour")?;
    let minute = parse_component::<u32>(parts[4], "minute")?;
    let second = parse_component::<u32>(parts[5], "second")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .map(Some)
        .ok_or_else(|| FieldError(format!("{} is not a valid timestamp", text)))
}

/// Parse the last-discussed cell: the `Never` marker or a date.
pub fn parse_discussion(text: &str) -> Result<LastDiscussion, FieldError> {
    if text == NEVER_MARKER {
        Ok(LastDiscussion::Never)
    } else {
        parse_date(text).map(LastDiscussion::On)
    }
}

/// Exactly `Yes` sets the flag; anything else clears it.
pub fn parse_flag(text: &str) -> bool {
    text == YES_MARKER
}

/// Parse a non-negative count.
pub fn parse_count<T: std::str::FromStr>(text: &str) -> Result<T, FieldError> {
    text.parse::<T>()
        .map_err(|_| FieldError(format!("expected a non-negative integer, found {:?}", text)))
}

fn parse_component<T: std::str::FromStr>(text: &str, what: &str) -> Result<T, FieldError> {
    text.parse::<T>()
        .map_err(|_| FieldError(format!("{} {:?} is not an integer", what, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_date() {
        let date = parse_date("2019-03-04").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2019, 3, 4));
    }

    #[test]
    fn test_parse_date_accepts_unpadded_components() {
        assert_eq!(
            parse_date("2019-3-4").unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2019/03/04").is_err());
        assert!(parse_date("2019-03").is_err());
        assert!(parse_date("").is_err());
        assert!(parse_date("2019-02-30").is_err());
        assert!(parse_date("2019-xx-01").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2019-03-04 12:30:00").unwrap().unwrap();

        assert_eq!((ts.year(), ts.month(), ts.day()), (2019, 3, 4));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 30, 0));
    }

    #[test]
    fn test_parse_timestamp_none_marker_is_absent() {
        assert_eq!(parse_timestamp("None").unwrap(), None);
    }

    #[test]
    fn test_parse_timestamp_rejects_date_only() {
        let err = parse_timestamp("2019-03-04").unwrap_err();
        assert!(err.0.contains("3 component"));
    }

    #[test]
    fn test_parse_timestamp_rejects_out_of_range_time() {
        assert!(parse_timestamp("2019-03-04 25:00:00").is_err());
        assert!(parse_timestamp("none").is_err());
    }

    #[test]
    fn test_parse_discussion() {
        assert_eq!(parse_discussion("Never").unwrap(), LastDiscussion::Never);
        assert_eq!(
            parse_discussion("2018-11-02").unwrap(),
            LastDiscussion::On(NaiveDate::from_ymd_opt(2018, 11, 2).unwrap())
        );
        assert!(parse_discussion("never").is_err());
    }

    #[test]
    fn test_parse_flag_only_accepts_yes() {
        assert!(parse_flag("Yes"));
        assert!(!parse_flag("No"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count::<u64>("1200").unwrap(), 1200);
        assert!(parse_count::<u64>("-3").is_err());
        assert!(parse_count::<u32>("1.5").is_err());
        assert!(parse_count::<u64>("").is_err());
    }
}
