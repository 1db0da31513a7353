//! Persistent record of holidays that have already been notified.
//!
//! Stored as JSON at `<data_dir>/notified_holidays.json`:
//!
//! ```json
//! {"version": 1, "notified": {"2025-01-01|New Year": {"notifiedAt": "2025-01-01T00:00:00Z"}}}
//! ```
//!
//! Loading never fails: a missing file is an empty ledger, and a corrupt file
//! is renamed to `notified_holidays.json.corrupt-<timestamp>` so the process
//! can continue with an empty ledger without writing over it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HolidayError, HolidayResult};
use crate::holiday::{HolidayRecord, KEY_SEPARATOR};
use crate::paths;

/// Entries older than this are dropped by [`NotificationLedger::prune_expired`].
pub const RETENTION_DAYS: i64 = 60;

const LEDGER_FILE_NAME: &str = "notified_holidays.json";
const LEDGER_VERSION: u32 = 1;

/// Separator used by ledgers written before keys carried `|`.
const LEGACY_KEY_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedEntry {
    pub notified_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    notified: BTreeMap<String, NotifiedEntry>,
}

fn default_version() -> u32 {
    LEDGER_VERSION
}

/// Shapes of ledger file we know how to read.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLedger {
    Current(LedgerFile),
    /// Plain list of `"<date>_<name>"` keys.
    Legacy(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    path: Option<PathBuf>,
    entries: BTreeMap<String, NotifiedEntry>,
}

impl NotificationLedger {
    /// A ledger that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn default_path() -> HolidayResult<PathBuf> {
        Ok(paths::data_dir()?.join(LEDGER_FILE_NAME))
    }

    /// Load the ledger backed by `path`, falling back to an empty ledger if
    /// the file is missing, unreadable or corrupt.
    ///
    /// A corrupt file is moved aside first. If that fails the ledger is kept
    /// in memory only, so the bad file is never overwritten.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match parse_entries(&content) {
                Ok(entries) => entries,
                Err(e) => match paths::move_aside(&path) {
                    Ok(backup) => {
                        tracing::warn!(
                            path = %path.display(),
                            backup = %backup.display(),
                            error = %e,
                            "ledger file is corrupt, moved aside and starting empty"
                        );
                        BTreeMap::new()
                    }
                    Err(move_err) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            move_error = %move_err,
                            "ledger file is corrupt and could not be moved aside, not persisting"
                        );
                        return Self::in_memory();
                    }
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read ledger, starting empty");
                BTreeMap::new()
            }
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "ledger loaded");

        NotificationLedger {
            path: Some(path),
            entries,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True iff `record` has not been notified yet.
    pub fn should_notify(&self, record: &HolidayRecord) -> bool {
        !self.entries.contains_key(&record.key())
    }

    /// Mark `record` as notified at `now`. Re-recording a key only refreshes
    /// its timestamp.
    pub fn record_notified(&mut self, record: &HolidayRecord, now: DateTime<Utc>) {
        self.entries
            .insert(record.key(), NotifiedEntry { notified_at: now });
    }

    /// Drop every entry notified more than [`RETENTION_DAYS`] before `now`.
    /// Returns how many entries were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let retention = Duration::days(RETENTION_DAYS);
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.notified_at <= retention);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned expired ledger entries");
        }
        removed
    }

    /// Write the ledger to its backing file. In-memory ledgers are a no-op.
    pub fn save(&self) -> HolidayResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = LedgerFile {
            version: LEDGER_VERSION,
            notified: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| HolidayError::Serialization(e.to_string()))?;

        // Write to a sibling file first so a crash never leaves a torn ledger
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&NotifiedEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries ordered newest first.
    pub fn recent(&self) -> Vec<(&str, &NotifiedEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        entries.sort_by(|a, b| b.1.notified_at.cmp(&a.1.notified_at).then(a.0.cmp(b.0)));
        entries
    }
}

fn parse_entries(content: &str) -> Result<BTreeMap<String, NotifiedEntry>, serde_json::Error> {
    let entries = match serde_json::from_str::<StoredLedger>(content)? {
        StoredLedger::Current(file) => {
            if file.version > LEDGER_VERSION {
                tracing::warn!(
                    version = file.version,
                    "ledger written by a newer version, reading known fields only"
                );
            }
            file.notified
        }
        StoredLedger::Legacy(keys) => {
            tracing::info!(count = keys.len(), "migrating legacy ledger format");
            migrate_legacy(keys, Utc::now())
        }
    };
    Ok(entries)
}

/// Convert `"<date>_<name>"` keys to current keys, timestamped at the holiday
/// date so pruning keeps working. Unparseable keys are kept verbatim and
/// stamped with `now`.
fn migrate_legacy(keys: Vec<String>, now: DateTime<Utc>) -> BTreeMap<String, NotifiedEntry> {
    keys.into_iter()
        .map(|key| {
            let parsed = key.split_once(LEGACY_KEY_SEPARATOR).and_then(|(date, name)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some((date, name.to_string()))
            });

            match parsed {
                Some((date, name)) => {
                    let notified_at = date.and_time(chrono::NaiveTime::MIN).and_utc();
                    let key = format!("{}{}{}", date.format("%Y-%m-%d"), KEY_SEPARATOR, name);
                    (key, NotifiedEntry { notified_at })
                }
                None => (key, NotifiedEntry { notified_at: now }),
            }
        })
        .collect()
}
