mod commands;
mod logging;
mod notifier;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use holiday_core::config::AppConfig;

#[derive(Parser)]
#[command(name = "holiday-notifier", version)]
#[command(about = "Track upcoming public holidays and get notified before they arrive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep running: check at startup and periodically, notify on the desktop.
    /// Press Enter to check now.
    Run,
    /// Run one check: fetch, notify about new holidays, update the ledger
    Check {
        /// Also show desktop notifications
        #[arg(long)]
        desktop: bool,
    },
    /// Show today's, tomorrow's and this week's holidays
    Upcoming,
    /// Holidays in a month (defaults to the current one)
    Month {
        #[arg(short, long)]
        year: Option<i32>,

        /// Month number, 1-12
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Holidays in a year grouped by month (defaults to the current one)
    Year { year: Option<i32> },
    /// Holidays that have already been notified
    Notified,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print all settings
    Show,
    /// Change a setting, e.g. `config set run_on_startup true`
    Set { key: String, value: String },
    /// Print the config and data file locations
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let _log_guard = logging::init_daemon()?;
            commands::run::run(load_config()?).await
        }
        Commands::Check { desktop } => {
            logging::init_cli();
            commands::check::run(load_config()?, desktop).await
        }
        Commands::Upcoming => {
            logging::init_cli();
            commands::upcoming::run(load_config()?).await
        }
        Commands::Month { year, month } => {
            logging::init_cli();
            commands::month::run(load_config()?, year, month).await
        }
        Commands::Year { year } => {
            logging::init_cli();
            commands::year::run(load_config()?, year).await
        }
        Commands::Notified => {
            logging::init_cli();
            commands::notified::run()
        }
        Commands::Config { action } => {
            logging::init_cli();
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => commands::config::show(),
                ConfigAction::Set { key, value } => commands::config::set(&key, &value),
                ConfigAction::Path => commands::config::path(),
            }
        }
    }
}

fn load_config() -> Result<AppConfig> {
    Ok(AppConfig::load()?)
}
