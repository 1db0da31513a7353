use anyhow::Result;
use chrono::{Datelike, Local};
use holiday_core::config::AppConfig;
use holiday_core::evaluator::classify_within;

use super::fetch_years;
use crate::render::Render;

pub async fn run(config: AppConfig) -> Result<()> {
    let today = Local::now().date_naive();
    let holidays = fetch_years(&config, &[today.year(), today.year() + 1]).await?;

    let classification = classify_within(today, &holidays, config.notification_days_ahead);
    println!("{}", classification.render());

    Ok(())
}
