//! Run summary and backup snapshots of the portal's entries.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::engine::RunOutcome;
use crate::error::{DiaryError, Result};
use crate::portal::RemoteEntryRecord;

const BACKUP_PREFIX: &str = "existing_entries_";
const MAX_NAME_SUFFIX: u32 = 1_000;

/// Counts reported at the end of every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub success_count: usize,
    pub fail_count: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "secs_f64")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// Elapsed seconds rounded to two decimals, as printed.
    #[must_use]
    pub fn elapsed_display(&self) -> String {
        format!("{:.2}s", self.elapsed.as_secs_f64())
    }
}

#[must_use]
pub fn summarize(outcomes: &[RunOutcome], elapsed: Duration) -> RunSummary {
    let success_count = outcomes.iter().filter(|o| o.is_success()).count();
    RunSummary {
        success_count,
        fail_count: outcomes.len() - success_count,
        elapsed,
    }
}

/// Write `records` to a new timestamped file in `dir`.
pub fn persist_backup(records: &[RemoteEntryRecord], dir: &Path) -> Result<PathBuf> {
    persist_backup_at(records, dir, Local::now())
}

/// Like [`persist_backup`] with a fixed clock.
///
/// Names are `existing_entries_YYYYMMDD_HHMMSS.json`; if that file exists a
/// numeric suffix is added. Existing files are never overwritten.
pub fn persist_backup_at(
    records: &[RemoteEntryRecord],
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|err| io_context(&err, "create", dir))?;

    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');

    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    for attempt in 0..MAX_NAME_SUFFIX {
        let name = if attempt == 0 {
            format!("{BACKUP_PREFIX}{stamp}.json")
        } else {
            format!("{BACKUP_PREFIX}{stamp}_{attempt}.json")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                info!(path = %path.display(), records = records.len(), "Backup saved");
                return Ok(path);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(io_context(&err, "write", &path)),
        }
    }
    Err(DiaryError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free backup name for {stamp} in {}", dir.display()),
    )))
}

fn io_context(err: &std::io::Error, action: &str, path: &Path) -> DiaryError {
    DiaryError::Io(std::io::Error::new(
        err.kind(),
        format!("{action} {}: {err}", path.display()),
    ))
}

fn secs_f64<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let rounded = (elapsed.as_secs_f64() * 100.0).round() / 100.0;
    serializer.serialize_f64(rounded)
}
