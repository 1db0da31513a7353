//! Core of holiday-notifier.
//!
//! - `holiday` and `evaluator`: holiday records and how they relate to today
//! - `ledger`: which holidays have already been notified
//! - `source` / `officeholidays`: where holidays come from
//! - `scheduler`: the periodic fetch / notify / persist cycle

pub mod clock;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod holiday;
pub mod ledger;
pub mod notification;
pub mod officeholidays;
pub mod paths;
pub mod scheduler;
pub mod source;

pub use error::{HolidayError, HolidayResult};
pub use holiday::HolidayRecord;
