//! CLI module - Command-line interface definitions
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::Parser;

pub mod output;

/// Submit internship diary entries to the InternYet portal
#[derive(Parser, Debug)]
#[command(name = "diary-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Validate and print payloads without logging in or submitting
    #[arg(long, conflicts_with = "fetch_only")]
    pub dry_run: bool,

    /// Only fetch and back up existing portal entries
    #[arg(long)]
    pub fetch_only: bool,

    /// Entries file (default: entries.json, or [paths] entries in config)
    #[arg(long, short = 'e', value_name = "FILE")]
    pub entries: Option<PathBuf>,

    /// Directory for backup snapshots (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Config file path (default: ./diary-sync.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit a JSON report on stdout instead of human-readable output
    #[arg(long)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// What a run does after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Fetch, back up, reconcile and submit.
    Submit,
    /// Validate and build payloads; no network at all.
    DryRun,
    /// Fetch and back up, then stop.
    FetchOnly,
}

impl Cli {
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else if self.fetch_only {
            RunMode::FetchOnly
        } else {
            RunMode::Submit
        }
    }
}
