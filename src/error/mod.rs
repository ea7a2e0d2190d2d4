//! Error handling for diary-sync.
//!
//! This module provides:
//! - [`DiaryError`]: The main error enum for all operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestion and context

mod codes;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for diary-sync operations.
#[derive(Error, Debug)]
pub enum DiaryError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to fetch existing entries: {0}")]
    Fetch(String),

    #[error("Unknown skill: {0}")]
    InvalidSkill(String),

    #[error("Submission rejected with status {status}: {body}")]
    Submission { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Invalid entries input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiaryError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication(_) => ErrorCode::NetworkAuthFailed,
            Self::Fetch(_) => ErrorCode::FetchFailed,
            Self::InvalidSkill(_) => ErrorCode::UnknownSkill,
            Self::Submission { .. } => ErrorCode::SubmissionRejected,
            Self::Transport(_) => ErrorCode::NetworkUnreachable,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Input(_) => ErrorCode::EntriesInvalid,
            Self::Io(_) => ErrorCode::StorageWriteError,
            Self::Json(_) => ErrorCode::SerializationError,
        }
    }

    /// Whether another submission attempt may succeed.
    ///
    /// Non-success statuses and transport failures are retried alike.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Submission { .. } | Self::Transport(_))
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::InvalidSkill(name) => Some(serde_json::json!({ "skill": name })),
            Self::Submission { status, .. } => Some(serde_json::json!({ "status": status })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_diary_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted on stdout in robot mode so scripts can branch on `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "UNKNOWN_SKILL")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 102)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "entry", "config", "network")
    pub category: String,
}

impl StructuredError {
    /// Create a structured error from a `DiaryError`.
    #[must_use]
    pub fn from_diary_error(err: &DiaryError) -> Self {
        let code = err.code();
        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion: code.suggestion().to_string(),
            context: err.context(),
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&DiaryError> for StructuredError {
    fn from(err: &DiaryError) -> Self {
        Self::from_diary_error(err)
    }
}

/// Result type alias using `DiaryError`.
pub type Result<T> = std::result::Result<T, DiaryError>;
