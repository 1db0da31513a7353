//! User-visible notifications and the events the scheduler emits.

use chrono::NaiveDate;
use serde::Serialize;

use crate::evaluator::Classification;
use crate::holiday::HolidayRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    Today,
    Tomorrow,
    Upcoming { days: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub record: HolidayRecord,
    pub kind: NotificationKind,
}

impl Notification {
    /// Build the notification for `record` as seen from `today`. Returns
    /// `None` for holidays in the past.
    pub fn for_record(record: &HolidayRecord, today: NaiveDate) -> Option<Self> {
        let kind = match record.days_from(today) {
            0 => NotificationKind::Today,
            1 => NotificationKind::Tomorrow,
            days if days > 1 => NotificationKind::Upcoming { days },
            _ => return None,
        };

        Some(Notification {
            record: record.clone(),
            kind,
        })
    }

    pub fn title(&self) -> String {
        match self.kind {
            NotificationKind::Today => "Holiday Today!".to_string(),
            NotificationKind::Tomorrow => "Holiday Tomorrow!".to_string(),
            NotificationKind::Upcoming { days } => format!("Upcoming Holiday in {days} days"),
        }
    }

    pub fn body(&self) -> String {
        match self.kind {
            NotificationKind::Today | NotificationKind::Tomorrow => {
                format!("{}\n{}", self.record.name, self.record.weekday_name())
            }
            NotificationKind::Upcoming { .. } => format!(
                "{}\n{} ({})",
                self.record.name,
                self.record.date.format("%Y-%m-%d"),
                self.record.weekday_name()
            ),
        }
    }
}

/// Events emitted by the scheduler for whatever surface is listening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SchedulerEvent {
    HolidaysUpdated(Classification),
    Notification(Notification),
    FetchError(String),
}
