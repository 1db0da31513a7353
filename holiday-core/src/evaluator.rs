//! Classification of holidays relative to a given day.
//!
//! Everything here is a pure function of "today" and the fetched records, so
//! it is cheap enough to re-run on every UI tick.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::holiday::HolidayRecord;

/// Size of the upcoming window in days (inclusive).
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Holidays bucketed relative to a day.
///
/// `today` and `tomorrow` are presentation refinements of `within_window`,
/// which covers every record with `0 <= date - as_of <= window_days`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub as_of: NaiveDate,
    pub today: Vec<HolidayRecord>,
    pub tomorrow: Vec<HolidayRecord>,
    pub within_window: Vec<HolidayRecord>,
    pub next_upcoming: Option<HolidayRecord>,
}

impl Classification {
    /// Records that qualify for a notification, each once, in source order.
    pub fn notification_candidates(&self) -> Vec<&HolidayRecord> {
        let mut seen = HashSet::new();
        self.today
            .iter()
            .chain(&self.tomorrow)
            .chain(&self.within_window)
            .filter(|record| seen.insert(record.key()))
            .collect()
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.next_upcoming
            .as_ref()
            .map(|record| Countdown::from_days(record.days_from(self.as_of)))
    }
}

/// Classify holidays using the default seven day window.
pub fn classify(today: NaiveDate, holidays: &[HolidayRecord]) -> Classification {
    classify_within(today, holidays, DEFAULT_WINDOW_DAYS)
}

pub fn classify_within(
    today: NaiveDate,
    holidays: &[HolidayRecord],
    window_days: i64,
) -> Classification {
    let mut classification = Classification {
        as_of: today,
        ..Default::default()
    };

    for record in holidays {
        let days = record.days_from(today);
        if days == 0 {
            classification.today.push(record.clone());
        }
        if days == 1 {
            classification.tomorrow.push(record.clone());
        }
        if (0..=window_days).contains(&days) {
            classification.within_window.push(record.clone());
        }
    }

    // min_by_key keeps the first of equal minima, so ties follow source order
    classification.next_upcoming = holidays
        .iter()
        .filter(|record| record.days_from(today) >= 0)
        .min_by_key(|record| record.days_from(today))
        .cloned();

    classification
}

/// Time remaining until the next holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Today,
    Tomorrow,
    InDays(i64),
}

impl Countdown {
    pub fn from_days(days: i64) -> Self {
        match days {
            0 => Countdown::Today,
            1 => Countdown::Tomorrow,
            n => Countdown::InDays(n),
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Countdown::Today => write!(f, "Today"),
            Countdown::Tomorrow => write!(f, "Tomorrow"),
            Countdown::InDays(n) => write!(f, "In {n} days"),
        }
    }
}

// =============================================================================
// Month / year views
// =============================================================================

/// Where a holiday sits relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HolidayStatus {
    Past,
    Today,
    Upcoming,
}

impl HolidayStatus {
    pub fn of(record: &HolidayRecord, today: NaiveDate) -> Self {
        match record.date.cmp(&today) {
            std::cmp::Ordering::Less => HolidayStatus::Past,
            std::cmp::Ordering::Equal => HolidayStatus::Today,
            std::cmp::Ordering::Greater => HolidayStatus::Upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEntry {
    pub record: HolidayRecord,
    pub status: HolidayStatus,
}

/// Holidays in the given month, sorted by day.
pub fn month_view(
    holidays: &[HolidayRecord],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Vec<ViewEntry> {
    let mut entries: Vec<ViewEntry> = holidays
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .map(|r| ViewEntry {
            record: r.clone(),
            status: HolidayStatus::of(r, today),
        })
        .collect();

    entries.sort_by_key(|e| e.record.date);
    entries
}

/// Holidays in the given year grouped by month number. Months without
/// holidays are absent.
pub fn year_view(
    holidays: &[HolidayRecord],
    year: i32,
    today: NaiveDate,
) -> BTreeMap<u32, Vec<ViewEntry>> {
    let mut months: BTreeMap<u32, Vec<ViewEntry>> = BTreeMap::new();

    for record in holidays.iter().filter(|r| r.date.year() == year) {
        months.entry(record.date.month()).or_default().push(ViewEntry {
            record: record.clone(),
            status: HolidayStatus::of(record, today),
        });
    }

    for entries in months.values_mut() {
        entries.sort_by_key(|e| e.record.date);
    }

    months
}
