// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::consts::*;
use crate::config::options::{
    ExportFormat, NotifyOptions, RunConfig, StateBackend, parse_recipients,
};
use crate::error::HarvestError;
use crate::notify::{LogNotifier, Notifier, SmtpNotifier};
use crate::page::WebDriverPage;
use crate::progress::LogProgress;
use crate::runner::{RunContext, RunSummary, open_store, run_once};

#[derive(Debug, Parser)]
#[command(name = "pricewatch", version, about = "Watch a product listing for price and discount changes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect once, diff against the last run, persist and notify.
    Run(RunArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Tsv,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Listing page to watch.
    #[arg(long, env = "TARGET_URL", default_value = DEFAULT_TARGET_URL)]
    pub url: String,

    /// Stop after this many unique items.
    #[arg(long, env = "TARGET_UNIQUE", default_value_t = TARGET_UNIQUE)]
    pub target: usize,

    /// Seconds to wait after each scroll.
    #[arg(long, env = "SCROLL_WAIT", default_value_t = SCROLL_WAIT_SECS)]
    pub scroll_wait: u64,

    #[arg(long, env = "MAX_SCROLLS", default_value_t = MAX_SCROLLS)]
    pub max_scrolls: usize,

    /// Consecutive rounds without a new item before giving up.
    #[arg(long, env = "STAGNANT_LIMIT", default_value_t = STAGNANT_LIMIT)]
    pub stagnant_limit: usize,

    /// Logical key the last state is stored under.
    #[arg(long, env = "STATE_KEY", default_value = DEFAULT_STATE_KEY)]
    pub state_key: String,

    /// Keep state in this SQLite file instead of JSON files under .store/state.
    #[arg(long, env = "STATE_DB")]
    pub state_db: Option<PathBuf>,

    #[arg(long, env = "DATA_DIR", default_value = DEFAULT_OUT_DIR)]
    pub data_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Write and mail a full snapshot every run.
    #[arg(long, env = "SAVE_SNAPSHOT_FILES", value_parser = clap::builder::FalseyValueParser::new())]
    pub save_snapshots: bool,

    #[arg(long, env = "KEEP_SNAPSHOT_FILES", default_value_t = KEEP_SNAPSHOT_FILES)]
    pub keep_snapshots: usize,

    /// Comma separated; receives change alerts and error reports.
    #[arg(long, env = "ALERT_TO", default_value = "")]
    pub alert_to: String,

    /// Comma separated; receives snapshot reports. Defaults to the SMTP user.
    #[arg(long, env = "SNAPSHOT_TO", default_value = "")]
    pub snapshot_to: String,

    #[arg(long, env = "SMTP_SERVER", default_value = SMTP_SERVER)]
    pub smtp_server: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = SMTP_PORT)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER", default_value = "")]
    pub smtp_user: String,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Log notifications instead of sending them.
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, env = "WEBDRIVER_URL", default_value = WEBDRIVER_URL)]
    pub webdriver: String,

    /// Browser executable to launch instead of the driver's default.
    #[arg(long, env = "CHROME_BINARY")]
    pub chrome_binary: Option<String>,

    /// Show the browser window.
    #[arg(long)]
    pub headful: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> RunConfig {
        let mut cfg = RunConfig::default();

        cfg.collect.url = self.url.clone();
        cfg.collect.target_count = self.target;
        cfg.collect.scroll_wait = Duration::from_secs(self.scroll_wait);
        cfg.collect.max_scroll_attempts = self.max_scrolls;
        cfg.collect.stagnation_limit = self.stagnant_limit;

        cfg.state.key = self.state_key.clone();
        if let Some(db) = &self.state_db {
            cfg.state.backend = StateBackend::Sqlite(db.clone());
        }

        cfg.export.data_dir = self.data_dir.clone();
        cfg.export.format = match self.format {
            Format::Csv => ExportFormat::Csv,
            Format::Tsv => ExportFormat::Tsv,
        };
        cfg.export.save_snapshots = self.save_snapshots;
        cfg.export.keep_snapshots = self.keep_snapshots;

        // snapshot reports go to the sending account unless told otherwise
        let mut snapshot_to = parse_recipients(&self.snapshot_to);
        if snapshot_to.is_empty() {
            snapshot_to = parse_recipients(&self.smtp_user);
        }

        cfg.notify = NotifyOptions {
            alert_to: parse_recipients(&self.alert_to),
            snapshot_to,
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            smtp_user: self.smtp_user.clone(),
            smtp_password: self.smtp_password.clone(),
            dry_run: self.dry_run,
        };

        cfg.browser.endpoint = self.webdriver.clone();
        cfg.browser.browser_binary = self.chrome_binary.clone();
        cfg.browser.headless = !self.headful;
        cfg
    }
}

/// Entry point for the binary: parse, set up logging, run once.
pub fn run() -> Result<(), HarvestError> {
    let cli = Cli::parse();
    let log_path = PathBuf::from(STORE_DIR).join(LOG_FILE);
    if let Err(e) = crate::log::init(Some(&log_path)) {
        eprintln!("Warning: debug log {} unavailable: {e}", log_path.display());
    }

    match cli.command {
        Command::Run(args) => {
            let summary = run_with(&args.to_config())?;
            println!(
                "collected={}/{} changes={} notified={} failed_notifications={} files={}",
                summary.collected,
                summary.target,
                summary.changes.len(),
                summary.notifications_sent,
                summary.notification_failures,
                summary.files_written.len(),
            );
            Ok(())
        }
    }
}

/// Validate, build the collaborators, and run once against a real browser.
pub fn run_with(cfg: &RunConfig) -> Result<RunSummary, HarvestError> {
    cfg.validate()?;

    let notifier: Box<dyn Notifier> = if cfg.notify.dry_run {
        Box::new(LogNotifier)
    } else {
        Box::new(SmtpNotifier::new(&cfg.notify)?)
    };
    let store = open_store(cfg, notifier.as_ref())?;

    let ctx = RunContext { config: cfg, store: store.as_ref(), notifier: notifier.as_ref() };
    let mut progress = LogProgress;
    run_once(&ctx, || WebDriverPage::open(&cfg.browser), Some(&mut progress))
}
