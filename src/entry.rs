//! Locally authored diary entries.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DiaryError, Result};

/// One day's diary record as written in the entries file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Natural key used to reconcile with the portal.
    pub date: NaiveDate,
    pub work_summary: String,
    /// Kept as a JSON number so `8` goes out as `8`, not `8.0`.
    pub hours: serde_json::Number,
    pub blockers: String,
    pub learnings: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Load the whole entries file. Any parse failure is fatal.
pub fn load_entries(path: &Path) -> Result<Vec<DiaryEntry>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| DiaryError::Input(format!("read {}: {err}", path.display())))?;
    parse_entries(&raw)
        .map_err(|err| DiaryError::Input(format!("parse {}: {err}", path.display())))
}

/// Parse entries from JSON text.
pub fn parse_entries(raw: &str) -> std::result::Result<Vec<DiaryEntry>, serde_json::Error> {
    serde_json::from_str(raw)
}
