use anyhow::Result;
use holiday_core::config::AppConfig;
use holiday_core::ledger::NotificationLedger;
use holiday_core::officeholidays::OfficeHolidaysSource;
use holiday_core::scheduler::{NotificationScheduler, RefreshOutcome};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::notifier::{self, DesktopNotifier};
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(config: AppConfig, desktop: bool) -> Result<()> {
    let source = OfficeHolidaysSource::from_config(&config)?;
    let ledger = NotificationLedger::load(NotificationLedger::default_path()?);

    // Outcome carries everything we print; events are for long-running listeners
    let (events, _) = mpsc::unbounded_channel();
    let scheduler = NotificationScheduler::new(source, ledger, events).configured(&config);

    let spinner = create_spinner("Checking holidays");
    let outcome = scheduler.try_refresh().await;
    spinner.finish_and_clear();

    match outcome {
        RefreshOutcome::Completed {
            classification,
            notified,
        } => {
            println!("{}", classification.render());
            println!();

            if notified.is_empty() {
                println!("{}", "No new holiday notifications".dimmed());
            } else {
                for notification in &notified {
                    println!("{}", notification.render());
                    if desktop {
                        notifier::deliver(&DesktopNotifier, notification).await;
                    }
                }
            }
            Ok(())
        }
        RefreshOutcome::Failed(reason) => {
            anyhow::bail!("{}", format!("Could not check holidays: {reason}").red())
        }
        RefreshOutcome::Skipped => Ok(()),
    }
}
