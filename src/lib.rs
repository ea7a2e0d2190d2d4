pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod payload;
pub mod portal;
pub mod reconcile;
pub mod report;
pub mod skills;
pub mod validate;

pub use error::{DiaryError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
