//! Where holiday records come from.
//!
//! The scheduler only depends on [`HolidaySource`]; the scraping details live
//! in [`crate::officeholidays`].

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::{HolidayError, HolidayResult};
use crate::holiday::HolidayRecord;

/// A provider of holiday records for a calendar year.
///
/// Implementations must return records in source order. An empty list is a
/// valid answer (e.g. the year has not been published yet).
pub trait HolidaySource: Send + Sync {
    fn fetch(&self, year: i32) -> impl Future<Output = HolidayResult<Vec<HolidayRecord>>> + Send;
}

/// Fetch `year` from `source`, treating a response slower than `limit` as a
/// failed fetch.
pub async fn fetch_with_timeout<S: HolidaySource>(
    source: &S,
    year: i32,
    limit: Duration,
) -> HolidayResult<Vec<HolidayRecord>> {
    timeout(limit, source.fetch(year))
        .await
        .map_err(|_| HolidayError::Timeout(limit.as_secs()))?
}
