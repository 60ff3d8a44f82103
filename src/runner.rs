// src/runner.rs
use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::{
    collect::{CollectStats, collect},
    config::options::RunConfig,
    diff::{ChangeRecord, diff},
    error::HarvestError,
    file::{cleanup_old_snapshots, export_changes, export_snapshot, timestamp_stem},
    notify::{self, Message, Notifier},
    page::PageObserver,
    progress::Progress,
    snapshot::Snapshot,
    store::{self, StateStore},
};

pub const CHECKED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a run is. `Done` and `Failed` are terminal; every run starts at `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    LoadingBaseline,
    Collecting,
    Diffing,
    Persisting,
    Notifying,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Collaborators for one run. Borrowed, so the caller owns their lifetimes.
pub struct RunContext<'a> {
    pub config: &'a RunConfig,
    pub store: &'a dyn StateStore,
    pub notifier: &'a dyn Notifier,
}

/// Summary of what one run saw and produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub checked_at: NaiveDateTime,
    pub collected: usize,
    pub target: usize,
    pub stats: CollectStats,
    pub changes: Vec<ChangeRecord>,
    pub files_written: Vec<PathBuf>,
    pub notifications_sent: usize,
    pub notification_failures: usize,
}

/// One full pass: baseline → collect → diff → persist → notify.
///
/// `open_page` is called only after the baseline loaded, so a dead store
/// fails the run before a browser is started. The page is dropped (session
/// closed) before this returns.
///
/// On a fatal error the run logs the phase, mails one best-effort error
/// report to the alert recipients, and returns the original error.
pub fn run_once<P, F>(
    ctx: &RunContext<'_>,
    open_page: F,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, HarvestError>
where
    P: PageObserver,
    F: FnOnce() -> Result<P, HarvestError>,
{
    let checked_at = Local::now().naive_local();
    let mut phase = RunPhase::Idle;

    match execute(ctx, checked_at, open_page, progress, &mut phase) {
        Ok(summary) => Ok(summary),
        Err(e) => {
            let failed_in = phase;
            enter(&mut phase, RunPhase::Failed);
            report_failure(ctx.config, ctx.notifier, failed_in, &e);
            Err(e)
        }
    }
}

/// Open the configured state store. A failure here aborts the run like any
/// other baseline failure: it is logged and reported to the alert recipients.
pub fn open_store(cfg: &RunConfig, notifier: &dyn Notifier) -> Result<Box<dyn StateStore>, HarvestError> {
    store::open(&cfg.state).inspect_err(|e| report_failure(cfg, notifier, RunPhase::LoadingBaseline, e))
}

/// Log a fatal error and mail one best-effort report. A failed send is logged only.
fn report_failure(cfg: &RunConfig, notifier: &dyn Notifier, failed_in: RunPhase, err: &HarvestError) {
    loge!("Run: failed in {failed_in}: {err}");

    let failed_at = Local::now().naive_local().format(CHECKED_AT_FORMAT).to_string();
    let report = notify::error_report(&cfg.notify.alert_to, &failed_at, &failed_in.to_string(), err);
    if let Err(mail_e) = notifier.send(&report) {
        loge!("Run: error report not delivered: {mail_e}");
    }
}

fn enter(phase: &mut RunPhase, next: RunPhase) {
    logd!("Run: {} -> {next}", *phase);
    *phase = next;
}

fn execute<P, F>(
    ctx: &RunContext<'_>,
    checked_at: NaiveDateTime,
    open_page: F,
    mut progress: Option<&mut dyn Progress>,
    phase: &mut RunPhase,
) -> Result<RunSummary, HarvestError>
where
    P: PageObserver,
    F: FnOnce() -> Result<P, HarvestError>,
{
    let cfg = ctx.config;
    let key = cfg.state.key.as_str();

    /* ---------------- Baseline ---------------- */
    enter(phase, RunPhase::LoadingBaseline);
    let prev = ctx.store.get(key)?;
    logf!("Run: loaded baseline keys={} state_key={key}", prev.len());

    /* ---------------- Collection ---------------- */
    enter(phase, RunPhase::Collecting);
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Opening {}", cfg.collect.url));
    }
    let collection = {
        let mut page = open_page()?;
        page.navigate(&cfg.collect.url)?;
        collect(&mut page, &cfg.site, &cfg.collect, progress.as_deref_mut().map(|p| p as &mut dyn Progress))?
    };
    let snapshot: Snapshot = collection.snapshot;
    logf!("Run: collected={} target={}", snapshot.len(), cfg.collect.target_count);

    /* ---------------- Diff ---------------- */
    enter(phase, RunPhase::Diffing);
    let cur = snapshot.to_state_map();
    let changes = diff(&prev, &cur);
    logf!("Run: changes={}", changes.len());

    /* ---------------- Persist ---------------- */
    enter(phase, RunPhase::Persisting);
    ctx.store.set(key, &cur)?;
    logf!("Run: saved current state ({} keys)", cur.len());

    /* ---------------- Notify ---------------- */
    enter(phase, RunPhase::Notifying);
    let mut summary = RunSummary {
        checked_at,
        collected: snapshot.len(),
        target: cfg.collect.target_count,
        stats: collection.stats,
        changes: Vec::new(),
        files_written: Vec::new(),
        notifications_sent: 0,
        notification_failures: 0,
    };
    let label = checked_at.format(CHECKED_AT_FORMAT).to_string();
    let stem = timestamp_stem(&checked_at);

    if cfg.export.save_snapshots {
        let path = match export_snapshot(&cfg.export, &stem, snapshot.items()) {
            Ok(p) => {
                logf!("Export: wrote {}", p.display());
                summary.files_written.push(p.clone());
                for old in cleanup_old_snapshots(&cfg.export) {
                    logd!("Export: removed old snapshot {}", old.display());
                }
                Some(p)
            }
            Err(e) => {
                logw!("Export: snapshot not written: {e}");
                None
            }
        };
        let msg = notify::snapshot_report(&cfg.notify.snapshot_to, &label, snapshot.len(), cfg.collect.target_count, key)
            .attach(path);
        deliver(ctx.notifier, &msg, &mut summary);
    }

    if changes.is_empty() {
        logf!("Run: no change | collected={} | {label}", snapshot.len());
    } else {
        let path = match export_changes(&cfg.export, &stem, &changes) {
            Ok(p) => {
                logf!("Export: wrote {}", p.display());
                summary.files_written.push(p.clone());
                Some(p)
            }
            Err(e) => {
                logw!("Export: change table not written: {e}");
                None
            }
        };
        let msg = notify::change_alert(&cfg.notify.alert_to, &label, &changes).attach(path);
        deliver(ctx.notifier, &msg, &mut summary);
    }

    summary.changes = changes;
    enter(phase, RunPhase::Done);
    Ok(summary)
}

/// Send, counting the outcome. Failures are logged and never escalate.
fn deliver(notifier: &dyn Notifier, msg: &Message, summary: &mut RunSummary) {
    if msg.recipients.is_empty() {
        logd!("Notify: no recipients for {:?}; skipped", msg.subject);
        return;
    }
    match notifier.send(msg) {
        Ok(()) => summary.notifications_sent += 1,
        Err(e) => {
            summary.notification_failures += 1;
            loge!("Notify: {:?} to {} failed: {e}", msg.subject, msg.recipients.join(","));
        }
    }
}
