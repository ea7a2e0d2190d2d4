//! Run orchestration.
//!
//! Submit: authenticate, fetch + back up, build the index, validate, submit.
//! Dry run: validate and build payloads only; no credentials, no network.
//! Fetch only: authenticate, fetch + back up, stop.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::cli::output::{Console, RunReport};
use crate::cli::{Cli, RunMode};
use crate::config::{Config, InvalidSkillPolicy};
use crate::engine::{EngineOptions, SubmissionEngine};
use crate::entry::{DiaryEntry, load_entries};
use crate::error::Result;
use crate::portal::{
    Credentials, DiaryPortal, FetchOptions, PortalClient, PortalSession, RemoteEntryRecord,
    fetch_all,
};
use crate::reconcile::ReconciliationIndex;
use crate::report::{persist_backup, summarize};
use crate::skills::SkillResolver;
use crate::validate::validate_all;

/// Everything resolved at startup from flags, config and environment.
#[derive(Debug)]
pub struct AppContext {
    pub mode: RunMode,
    pub config: Config,
    pub entries_path: PathBuf,
    pub backup_dir: PathBuf,
    pub console: Console,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let entries_path = cli
            .entries
            .clone()
            .unwrap_or_else(|| config.paths.entries.clone());
        let backup_dir = cli
            .backup_dir
            .clone()
            .unwrap_or_else(|| config.paths.backup_dir.clone());

        Ok(Self {
            mode: cli.mode(),
            config,
            entries_path,
            backup_dir,
            console: Console::new(cli.robot),
        })
    }
}

/// Execute one run. Per-entry failures are reported, not returned.
pub fn run(ctx: &AppContext) -> Result<()> {
    let started = Instant::now();
    let console = ctx.console;
    console.banner();

    match ctx.mode {
        RunMode::FetchOnly => {
            let credentials = Credentials::from_env()?;
            let session = login(ctx, &credentials)?;
            let (records, backup) = fetch_and_backup(ctx, &session)?;
            console.info("\n📦 Fetch-only mode complete.\n");
            console.report(&RunReport {
                mode: ctx.mode,
                backup: Some(backup),
                fetched: Some(records.len()),
                summary: None,
                outcomes: Vec::new(),
            })
        }
        RunMode::DryRun => {
            console.warn("Dry-run mode: login skipped");
            let resolver = SkillResolver::load(ctx.config.skills.table.as_deref())?;
            let entries = load_and_check(ctx, &resolver)?;
            let index = ReconciliationIndex::empty();
            submit_entries(ctx, &resolver, &entries, &index, None, started, None, None)
        }
        RunMode::Submit => {
            // Everything local is checked before the first request goes out.
            let credentials = Credentials::from_env()?;
            let resolver = SkillResolver::load(ctx.config.skills.table.as_deref())?;
            let entries = load_and_check(ctx, &resolver)?;

            let session = login(ctx, &credentials)?;
            let (records, backup) = fetch_and_backup(ctx, &session)?;
            let index = ReconciliationIndex::build(&records);
            info!(remote = records.len(), dates = index.len(), "Reconciliation index ready");

            submit_entries(
                ctx,
                &resolver,
                &entries,
                &index,
                Some(&session),
                started,
                Some(backup),
                Some(records.len()),
            )
        }
    }
}

fn login(ctx: &AppContext, credentials: &Credentials) -> Result<PortalSession> {
    ctx.console.step("Logging in...");
    let session = PortalClient::new(&ctx.config.portal)?.authenticate(credentials)?;
    ctx.console.success("Logged in successfully");
    Ok(session)
}

fn fetch_and_backup(
    ctx: &AppContext,
    session: &PortalSession,
) -> Result<(Vec<RemoteEntryRecord>, PathBuf)> {
    ctx.console.step("Fetching existing portal entries...");
    let records = fetch_all(session, &FetchOptions::from(&ctx.config.fetch))?;
    ctx.console
        .success(&format!("Fetched {} existing entries", records.len()));

    let backup = persist_backup(&records, &ctx.backup_dir)?;
    ctx.console
        .success(&format!("Backup saved → {}", backup.display()));
    Ok((records, backup))
}

fn load_and_check(ctx: &AppContext, resolver: &SkillResolver) -> Result<Vec<DiaryEntry>> {
    let entries = load_entries(&ctx.entries_path)?;
    ctx.console
        .info(&format!("📄 Loaded {} entries", entries.len()));
    if ctx.config.submit.on_invalid_skill == InvalidSkillPolicy::Fail {
        validate_all(&entries, resolver)?;
    }
    Ok(entries)
}

#[allow(clippy::too_many_arguments)]
fn submit_entries(
    ctx: &AppContext,
    resolver: &SkillResolver,
    entries: &[DiaryEntry],
    index: &ReconciliationIndex,
    portal: Option<&dyn DiaryPortal>,
    started: Instant,
    backup: Option<PathBuf>,
    fetched: Option<usize>,
) -> Result<()> {
    let console = ctx.console;
    console.section("📤 Processing Entries");

    let engine = SubmissionEngine::new(resolver, EngineOptions::from(&ctx.config));
    let outcomes = engine.process(entries, index, portal, |event| console.event(event))?;

    let summary = summarize(&outcomes, started.elapsed());
    info!(
        success = summary.success_count,
        failed = summary.fail_count,
        elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
        "Run complete"
    );
    console.summary(&summary);
    console.report(&RunReport {
        mode: ctx.mode,
        backup,
        fetched,
        summary: Some(summary),
        outcomes,
    })
}
