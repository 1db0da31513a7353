//! Long-running mode: periodic refresh, desktop notifications, and a manual
//! refresh whenever a line is entered on stdin.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use holiday_core::config::AppConfig;
use holiday_core::ledger::NotificationLedger;
use holiday_core::notification::SchedulerEvent;
use holiday_core::officeholidays::OfficeHolidaysSource;
use holiday_core::scheduler::{NotificationScheduler, SchedulerState};
use holiday_core::source::HolidaySource;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use crate::notifier::{self, DesktopNotifier, Notifier};
use crate::render::Render;

const COUNTDOWN_TICK: Duration = Duration::from_secs(60);

pub async fn run(config: AppConfig) -> Result<()> {
    let source = OfficeHolidaysSource::from_config(&config)?;
    let ledger = NotificationLedger::load(NotificationLedger::default_path()?);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let scheduler = Arc::new(NotificationScheduler::new(source, ledger, events_tx).configured(&config));

    // One pending manual trigger is enough; extra presses collapse into it
    let (trigger_tx, trigger_rx) = mpsc::channel(1);

    tokio::spawn(handle_events(events_rx, DesktopNotifier));
    tokio::spawn(read_triggers(trigger_tx));
    tokio::spawn(show_state(scheduler.subscribe_state()));
    tokio::spawn(show_countdown(Arc::clone(&scheduler)));

    println!(
        "{} {}",
        "Holiday notifier running.".bold(),
        "Press Enter to refresh now, Ctrl-C to quit.".dimmed()
    );
    if config.run_on_startup {
        tracing::info!("run_on_startup is set; register this command with your login items");
    }

    let period = config.check_interval();
    tracing::info!(hours = period.as_secs() / 3600, "starting scheduler");

    scheduler
        .run(period, trigger_rx, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}

async fn handle_events<N>(mut events: mpsc::UnboundedReceiver<SchedulerEvent>, notifier: N)
where
    N: Notifier + Clone + 'static,
{
    while let Some(event) = events.recv().await {
        match event {
            SchedulerEvent::HolidaysUpdated(classification) => {
                println!("\n{}", classification.render());
            }
            SchedulerEvent::Notification(notification) => {
                notifier::deliver(&notifier, &notification).await;
                println!("{}", notification.render());
            }
            SchedulerEvent::FetchError(reason) => {
                eprintln!("{}", format!("Could not refresh holidays: {reason}").yellow());
            }
        }
    }
}

async fn read_triggers(triggers: mpsc::Sender<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(_)) => {
                if triggers.try_send(()).is_err() {
                    tracing::debug!("manual refresh already queued");
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading stdin");
                break;
            }
        }
    }
}

async fn show_state(mut state: watch::Receiver<SchedulerState>) {
    while state.changed().await.is_ok() {
        if *state.borrow_and_update() == SchedulerState::Fetching {
            println!("{}", "Checking holidays...".dimmed());
        }
    }
}

/// Re-classify the loaded holidays every minute so the countdown follows the
/// date without refetching.
async fn show_countdown<S: HolidaySource>(scheduler: Arc<NotificationScheduler<S>>) {
    let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
    let mut last = None;

    loop {
        ticker.tick().await;

        let classification = scheduler.classify_now();
        let line = match (&classification.next_upcoming, classification.countdown()) {
            (Some(next), Some(countdown)) => format!("{}: {}", next.name, countdown),
            _ => continue,
        };

        if last.as_ref() != Some(&line) {
            println!("{} {}", "Next holiday".dimmed(), line.green());
            last = Some(line);
        }
    }
}
