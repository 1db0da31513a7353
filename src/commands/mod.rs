pub mod check;
pub mod config;
pub mod month;
pub mod notified;
pub mod run;
pub mod upcoming;
pub mod year;

use anyhow::Result;
use holiday_core::HolidayRecord;
use holiday_core::config::AppConfig;
use holiday_core::officeholidays::OfficeHolidaysSource;
use holiday_core::source::fetch_with_timeout;
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::utils::tui::create_spinner;

/// Fetch the given years in order, with a spinner, without touching the
/// notification ledger.
pub async fn fetch_years(config: &AppConfig, years: &[i32]) -> Result<Vec<HolidayRecord>> {
    let source = OfficeHolidaysSource::from_config(config)?;
    let limit = Duration::from_secs(config.request_timeout_secs.saturating_mul(3).max(1));

    let label = years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let spinner = create_spinner(format!("Fetching holidays for {label}"));

    let mut holidays = Vec::new();
    for &year in years {
        match fetch_with_timeout(&source, year, limit).await {
            Ok(records) => holidays.extend(records),
            Err(e) => {
                spinner.finish_and_clear();
                anyhow::bail!("{}", format!("Could not fetch holidays for {year}: {e}").red());
            }
        }
    }
    spinner.finish_and_clear();

    Ok(holidays)
}
