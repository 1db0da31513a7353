use anyhow::Result;
use holiday_core::ledger::{NotificationLedger, RETENTION_DAYS};
use owo_colors::OwoColorize;

use crate::render::render_notified;

pub fn run() -> Result<()> {
    let ledger = NotificationLedger::load(NotificationLedger::default_path()?);

    if ledger.is_empty() {
        println!("{}", "No notifications yet".dimmed());
        return Ok(());
    }

    println!(
        "{} {}",
        "Recent notifications".bold(),
        format!("(kept for {RETENTION_DAYS} days)").dimmed()
    );
    for (key, entry) in ledger.recent() {
        println!("{}", render_notified(key, entry));
    }

    Ok(())
}
