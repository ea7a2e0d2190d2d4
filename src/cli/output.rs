//! Console output for runs: colored progress lines for people, one JSON
//! document for robot mode.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::RunMode;
use crate::engine::{EngineEvent, EntryState, RunOutcome};
use crate::error::{DiaryError, Result};
use crate::report::RunSummary;

/// Final report printed in robot mode.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    pub outcomes: Vec<RunOutcome>,
}

/// Prints run progress. Silent in robot mode, where only the report is written.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    robot: bool,
}

impl Console {
    #[must_use]
    pub const fn new(robot: bool) -> Self {
        Self { robot }
    }

    pub fn banner(&self) {
        if self.robot {
            return;
        }
        println!("\n{}\n", "🚀 InternYet Diary Sync".cyan().bold());
    }

    pub fn step(&self, msg: &str) {
        if !self.robot {
            println!("{} {}", "⏳".yellow(), msg.yellow());
        }
    }

    pub fn info(&self, msg: &str) {
        if !self.robot {
            println!("{}", msg.cyan());
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.robot {
            println!("{} {}", "✓".green(), msg.green());
        }
    }

    pub fn warn(&self, msg: &str) {
        if !self.robot {
            println!("{} {}", "⚠".yellow(), msg.yellow());
        }
    }

    pub fn section(&self, title: &str) {
        if !self.robot {
            println!("\n{}\n", title.magenta().bold());
        }
    }

    /// Print one engine event as it happens.
    pub fn event(&self, event: &EngineEvent<'_>) {
        if self.robot {
            return;
        }
        match event {
            EngineEvent::Retrying {
                position,
                total,
                date,
                attempt,
                error,
            } => {
                println!(
                    "{} {} {} retry {} ({})",
                    "⚠".yellow(),
                    prefix(*position, *total).dimmed(),
                    date,
                    attempt,
                    error.to_string().dimmed()
                );
            }
            EngineEvent::Resolved {
                total,
                outcome,
                payload,
            } => {
                let prefix = prefix(outcome.position, *total);
                match outcome.state {
                    EntryState::Succeeded => println!(
                        "{} {} {} → {}",
                        "✓".green(),
                        prefix.dimmed(),
                        outcome.date,
                        outcome.action.to_string().green()
                    ),
                    EntryState::Failed => println!(
                        "{} {} Failed {} ({})",
                        "✗".red(),
                        prefix.dimmed(),
                        outcome.date,
                        outcome.message.red()
                    ),
                    EntryState::DryRun => {
                        println!(
                            "{} {} {}",
                            prefix.blue(),
                            outcome.action.to_string().blue().bold(),
                            outcome.date
                        );
                        if let Some(payload) = payload {
                            match serde_json::to_string_pretty(payload) {
                                Ok(json) => println!("{}", json.dimmed()),
                                Err(err) => {
                                    tracing::warn!(error = %err, "Could not render payload");
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn summary(&self, summary: &RunSummary) {
        if self.robot {
            return;
        }
        println!("\n{}", "📊 SUMMARY".cyan().bold());
        println!("Success : {}", summary.success_count.to_string().green());
        println!("Failed  : {}", summary.fail_count.to_string().red());
        println!("Time    : {}\n", summary.elapsed_display());
    }

    /// Write the robot-mode report; no-op for people.
    pub fn report(&self, report: &RunReport) -> Result<()> {
        if self.robot {
            emit_json(report)?;
        }
        Ok(())
    }
}

fn prefix(position: usize, total: usize) -> String {
    format!("[{position}/{total}]")
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).map_err(DiaryError::Json)?;
    println!("{payload}");
    Ok(())
}
