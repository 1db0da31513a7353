//! Platform directories used by holiday-notifier.
//!
//!   config: ~/.config/holiday-notifier/config.toml
//!   data:   ~/.local/share/holiday-notifier/ (ledger, logs)

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{HolidayError, HolidayResult};

const APP_DIR_NAME: &str = "holiday-notifier";

pub fn config_dir() -> HolidayResult<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| HolidayError::Config("Could not determine config directory".into()))?
        .join(APP_DIR_NAME))
}

pub fn data_dir() -> HolidayResult<PathBuf> {
    Ok(dirs::data_local_dir()
        .ok_or_else(|| HolidayError::Config("Could not determine data directory".into()))?
        .join(APP_DIR_NAME))
}

/// Rename an unparseable file to `<name>.corrupt-<timestamp>` next to it, so
/// the next save starts fresh without destroying the original bytes.
pub(crate) fn move_aside(path: &Path) -> HolidayResult<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
    let backup = path.with_file_name(format!("{name}.corrupt-{stamp}"));

    std::fs::rename(path, &backup)?;
    Ok(backup)
}
