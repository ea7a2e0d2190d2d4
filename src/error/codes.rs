//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Entry input and validation errors
//! - 3xx: Config errors
//! - 5xx: Network and portal errors
//! - 6xx: Storage errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `UnknownSkill` -> E102).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Entry errors (1xx)
    // ========================================
    /// E101: Entries file is unreadable or malformed
    EntriesInvalid,
    /// E102: An entry references a skill missing from the lookup table
    UnknownSkill,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value (e.g. credentials) is missing
    ConfigMissingRequired,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Request never produced a response
    NetworkUnreachable,
    /// E503: Portal rejected the credentials
    NetworkAuthFailed,
    /// E504: Listing of existing entries failed
    FetchFailed,
    /// E505: Portal answered a submission with a non-success status
    SubmissionRejected,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E602: Could not write to disk
    StorageWriteError,
    /// E605: JSON encode/decode failed
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `UnknownSkill` -> 102).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::EntriesInvalid => 101,
            Self::UnknownSkill => 102,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::NetworkUnreachable => 501,
            Self::NetworkAuthFailed => 503,
            Self::FetchFailed => 504,
            Self::SubmissionRejected => 505,

            Self::StorageWriteError => 602,
            Self::SerializationError => 605,
        }
    }

    /// Get the error code as a formatted string (e.g., "E102").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::EntriesInvalid => "Check the entries file is a JSON array of objects with date, work_summary, hours, blockers, learnings and skills",
            Self::UnknownSkill => "Fix the skill name in the entries file, or add it to the table referenced by [skills] table in the config",

            Self::ConfigInvalid => "Check TOML syntax and values in diary-sync.toml and the DIARY_SYNC_* environment variables",
            Self::ConfigMissingRequired => "Set INTERNYET_EMAIL and INTERNYET_PASSWORD, or run with --dry-run",

            Self::NetworkUnreachable => "Check your network connection and that the portal base URL is reachable",
            Self::NetworkAuthFailed => "Verify INTERNYET_EMAIL and INTERNYET_PASSWORD by logging in through the portal website",
            Self::FetchFailed => "The portal listing failed. Retry later; nothing has been submitted yet",
            Self::SubmissionRejected => "Inspect the portal response body. Re-running is safe: existing dates are updated, not duplicated",

            Self::StorageWriteError => "Check disk space and write permissions on the backup directory",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::EntriesInvalid
            | Self::UnknownSkill
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::NetworkUnreachable
            | Self::NetworkAuthFailed
            | Self::FetchFailed
            | Self::SubmissionRejected
            | Self::StorageWriteError => true,
            Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::EntriesInvalid | Self::UnknownSkill => "entry",
            Self::ConfigInvalid | Self::ConfigMissingRequired => "config",
            Self::NetworkUnreachable
            | Self::NetworkAuthFailed
            | Self::FetchFailed
            | Self::SubmissionRejected => "network",
            Self::StorageWriteError | Self::SerializationError => "storage",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.numeric())
    }
}
