//! Submission engine: validate, build, submit with bounded retry, throttle.
//!
//! Entries are handled one at a time in input order. Each entry reaches a
//! terminal [`EntryState`] before the next one starts, and consecutive
//! write requests are separated by the configured request delay.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, InvalidSkillPolicy};
use crate::entry::DiaryEntry;
use crate::error::{DiaryError, Result};
use crate::payload::{Action, PayloadDefaults, SubmissionPayload};
use crate::portal::DiaryPortal;
use crate::reconcile::ReconciliationIndex;
use crate::skills::SkillResolver;
use crate::validate::validate;

/// Finite, deterministic retry schedule for one submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub delay: Duration,
    /// Multiplier applied to `delay` for each later attempt (1.0 = fixed).
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            backoff: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Wait before `attempt` (1-based). The first attempt never waits.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let secs = self.delay.as_secs_f64() * self.backoff.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub retry: RetryPolicy,
    /// Pause after each submitted entry.
    pub request_delay: Duration,
    pub on_invalid_skill: InvalidSkillPolicy,
    pub defaults: PayloadDefaults,
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: config.submit.max_attempts.max(1),
                delay: Duration::from_millis(config.submit.retry_delay_ms),
                backoff: config.submit.retry_backoff,
            },
            request_delay: Duration::from_millis(config.submit.request_delay_ms),
            on_invalid_skill: config.submit.on_invalid_skill,
            defaults: PayloadDefaults::from(&config.portal),
        }
    }
}

/// Terminal state of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Succeeded,
    Failed,
    /// Validated and built, nothing sent.
    DryRun,
}

/// Result of processing one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// 1-based position in the input.
    pub position: usize,
    pub date: NaiveDate,
    pub action: Action,
    pub state: EntryState,
    /// Submission attempts made; 0 when nothing was sent.
    pub attempts: u32,
    pub message: String,
}

impl RunOutcome {
    /// Dry-run outcomes count as successes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.state, EntryState::Succeeded | EntryState::DryRun)
    }
}

/// Progress notifications, emitted as entries resolve.
#[derive(Debug)]
pub enum EngineEvent<'a> {
    Retrying {
        position: usize,
        total: usize,
        date: NaiveDate,
        attempt: u32,
        error: &'a DiaryError,
    },
    Resolved {
        total: usize,
        outcome: &'a RunOutcome,
        payload: Option<&'a SubmissionPayload>,
    },
}

pub struct SubmissionEngine<'a> {
    resolver: &'a SkillResolver,
    options: EngineOptions,
}

impl<'a> SubmissionEngine<'a> {
    #[must_use]
    pub const fn new(resolver: &'a SkillResolver, options: EngineOptions) -> Self {
        Self { resolver, options }
    }

    /// Process `entries` in order.
    ///
    /// With `portal == None` nothing is sent and no delays are taken; each
    /// valid entry resolves as [`EntryState::DryRun`]. An unknown skill aborts
    /// the run under [`InvalidSkillPolicy::Fail`]; per-entry submission
    /// failures never do.
    pub fn process<F>(
        &self,
        entries: &[DiaryEntry],
        index: &ReconciliationIndex,
        portal: Option<&dyn DiaryPortal>,
        mut on_event: F,
    ) -> Result<Vec<RunOutcome>>
    where
        F: FnMut(&EngineEvent<'_>),
    {
        let total = entries.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, entry) in entries.iter().enumerate() {
            let position = i + 1;

            let skill_ids = match validate(entry, self.resolver) {
                Ok(ids) => ids,
                Err(err) if self.options.on_invalid_skill == InvalidSkillPolicy::Fail => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(position = position, date = %entry.date, error = %err, "Skipping invalid entry");
                    let outcome = RunOutcome {
                        position,
                        date: entry.date,
                        action: action_for(entry.date, index),
                        state: EntryState::Failed,
                        attempts: 0,
                        message: err.to_string(),
                    };
                    on_event(&EngineEvent::Resolved {
                        total,
                        outcome: &outcome,
                        payload: None,
                    });
                    outcomes.push(outcome);
                    continue;
                }
            };

            let payload = SubmissionPayload::build(entry, skill_ids, index, self.options.defaults);
            let action = payload.action();

            let outcome = match portal {
                None => {
                    debug!(position = position, date = %entry.date, action = %action, "Dry run");
                    RunOutcome {
                        position,
                        date: entry.date,
                        action,
                        state: EntryState::DryRun,
                        attempts: 0,
                        message: "dry run".to_string(),
                    }
                }
                Some(portal) => {
                    self.submit_with_retry(portal, &payload, position, total, &mut on_event)
                }
            };

            on_event(&EngineEvent::Resolved {
                total,
                outcome: &outcome,
                payload: Some(&payload),
            });
            outcomes.push(outcome);

            if portal.is_some() && position < total && !self.options.request_delay.is_zero() {
                std::thread::sleep(self.options.request_delay);
            }
        }

        Ok(outcomes)
    }

    fn submit_with_retry<F>(
        &self,
        portal: &dyn DiaryPortal,
        payload: &SubmissionPayload,
        position: usize,
        total: usize,
        on_event: &mut F,
    ) -> RunOutcome
    where
        F: FnMut(&EngineEvent<'_>),
    {
        let retry = self.options.retry;
        let action = payload.action();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let delay = retry.delay_before(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            match portal.submit(payload) {
                Ok(()) => {
                    info!(position = position, date = %payload.date, action = %action, attempt = attempt, "Entry submitted");
                    return RunOutcome {
                        position,
                        date: payload.date,
                        action,
                        state: EntryState::Succeeded,
                        attempts: attempt,
                        message: action.to_string(),
                    };
                }
                Err(err) if err.is_retryable() && attempt < retry.max_attempts => {
                    warn!(
                        position = position,
                        date = %payload.date,
                        attempt = attempt,
                        error = %err,
                        "Submission failed, retrying"
                    );
                    on_event(&EngineEvent::Retrying {
                        position,
                        total,
                        date: payload.date,
                        attempt,
                        error: &err,
                    });
                }
                Err(err) => {
                    warn!(
                        position = position,
                        date = %payload.date,
                        attempts = attempt,
                        error = %err,
                        "Submission failed"
                    );
                    return RunOutcome {
                        position,
                        date: payload.date,
                        action,
                        state: EntryState::Failed,
                        attempts: attempt,
                        message: err.to_string(),
                    };
                }
            }
        }
    }
}

fn action_for(date: NaiveDate, index: &ReconciliationIndex) -> Action {
    if index.get(date).is_some() {
        Action::Update
    } else {
        Action::Create
    }
}
