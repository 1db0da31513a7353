//! Holiday records as fetched from a holiday source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the date and the name in a ledger key.
pub const KEY_SEPARATOR: char = '|';

/// A single public holiday: a date and a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub name: String,
}

impl HolidayRecord {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        HolidayRecord {
            date,
            name: name.into(),
        }
    }

    /// Stable ledger key: ISO date, separator, name.
    ///
    /// A holiday re-scraped under a different label produces a different key.
    pub fn key(&self) -> String {
        format!("{}{}{}", self.date.format("%Y-%m-%d"), KEY_SEPARATOR, self.name)
    }

    /// Full weekday name, e.g. "Monday".
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    /// Signed number of days from `today` until this holiday.
    pub fn days_from(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }
}

impl fmt::Display for HolidayRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.date.format("%Y-%m-%d"))
    }
}

/// Split a ledger key back into its date and name.
pub fn parse_key(key: &str) -> Option<(NaiveDate, &str)> {
    let (date, name) = key.split_once(KEY_SEPARATOR)?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_key_is_iso_date_and_name() {
        let record = HolidayRecord::new(date(2025, 1, 1), "New Year");
        assert_eq!(record.key(), "2025-01-01|New Year");
    }

    #[test]
    fn test_renamed_holiday_has_distinct_key() {
        let a = HolidayRecord::new(date(2025, 3, 31), "Hari Raya Puasa");
        let b = HolidayRecord::new(date(2025, 3, 31), "Hari Raya Aidilfitri");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_parse_key_roundtrip_keeps_separator_in_name() {
        let record = HolidayRecord::new(date(2025, 5, 1), "Labour Day | Workers");
        let key = record.key();
        let (d, name) = parse_key(&key).expect("key should parse");
        assert_eq!(d, record.date);
        assert_eq!(name, "Labour Day | Workers");
    }

    #[test]
    fn test_parse_key_rejects_garbage() {
        assert!(parse_key("not a key").is_none());
        assert!(parse_key("2025-13-01|Nope").is_none());
    }

    #[test]
    fn test_weekday_name() {
        let record = HolidayRecord::new(date(2025, 1, 1), "New Year");
        assert_eq!(record.weekday_name(), "Wednesday");
    }

    #[test]
    fn test_days_from() {
        let record = HolidayRecord::new(date(2025, 1, 10), "Holiday C");
        assert_eq!(record.days_from(date(2025, 1, 1)), 9);
        assert_eq!(record.days_from(date(2025, 1, 11)), -1);
    }
}
