use anyhow::Result;
use holiday_core::config::{AppConfig, KEYS};
use holiday_core::ledger::NotificationLedger;
use holiday_core::paths;
use owo_colors::OwoColorize;

pub fn show() -> Result<()> {
    let config = AppConfig::load()?;

    println!("{}", "Settings".bold());
    for key in KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("  {:<26}{}", key, value);
    }

    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = AppConfig::load()?;
    config.set(key, value)?;
    config.save()?;

    let key = key.replace('-', "_");
    println!(
        "{} {} = {}",
        "Saved".green(),
        key,
        config.get(&key).unwrap_or_default()
    );

    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", "Paths".bold());
    println!("  Config:  {}", AppConfig::config_path()?.display());
    println!("  Ledger:  {}", NotificationLedger::default_path()?.display());
    println!("  Logs:    {}", paths::data_dir()?.display());

    Ok(())
}
