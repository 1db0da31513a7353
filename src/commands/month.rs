use anyhow::Result;
use chrono::{Datelike, Local};
use holiday_core::config::AppConfig;
use holiday_core::evaluator::month_view;

use super::fetch_years;
use crate::render::render_month;

pub async fn run(config: AppConfig, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());

    let holidays = fetch_years(&config, &[year]).await?;
    let entries = month_view(&holidays, year, month, today);

    println!("{}", render_month(year, month, &entries));
    Ok(())
}
