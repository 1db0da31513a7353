use anyhow::Result;
use chrono::{Datelike, Local};
use holiday_core::config::AppConfig;
use holiday_core::evaluator::year_view;

use super::fetch_years;
use crate::render::render_year;

pub async fn run(config: AppConfig, year: Option<i32>) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or(today.year());

    let holidays = fetch_years(&config, &[year]).await?;
    let months = year_view(&holidays, year, today);

    println!("{}", render_year(year, &months));
    Ok(())
}
