// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;
use crate::error::HarvestError;
use crate::page::FieldChain;

/// Everything one run needs. Built once at startup, then only borrowed.
#[derive(Debug, Default)]
pub struct RunConfig {
    pub collect: CollectOptions,
    pub site: SiteProfile,
    pub state: StateOptions,
    pub export: ExportOptions,
    pub notify: NotifyOptions,
    pub browser: BrowserOptions,
}

impl RunConfig {
    /// Reject a config that cannot produce a meaningful run, before any work.
    pub fn validate(&self) -> Result<(), HarvestError> {
        let c = &self.collect;
        let bad = |what: &str| Err(HarvestError::ConfigurationMissing(what.to_string()));

        if c.url.trim().is_empty() { return bad("target URL is empty"); }
        if c.target_count == 0 { return bad("target count must be at least 1"); }
        if c.max_scroll_attempts == 0 { return bad("scroll-attempt ceiling must be at least 1"); }
        if c.stagnation_limit == 0 { return bad("stagnation ceiling must be at least 1"); }
        if !(c.scroll_fraction > 0.0 && c.scroll_fraction <= 1.0) {
            return bad("scroll fraction must be in (0, 1]");
        }
        if self.site.link_selector.trim().is_empty() { return bad("link selector is empty"); }
        if self.state.key.trim().is_empty() { return bad("state key is empty"); }
        if self.notify.alert_to.is_empty() { return bad("no alert recipients (ALERT_TO)"); }

        if !self.notify.dry_run {
            if self.notify.smtp_user.trim().is_empty() { return bad("SMTP_USER is empty"); }
            if self.notify.smtp_password.as_deref().is_none_or(|p| p.is_empty()) {
                return bad("SMTP_PASSWORD is empty");
            }
        }
        Ok(())
    }
}

/* ---------------- Collection ---------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct CollectOptions {
    pub url: String,
    pub target_count: usize,
    pub max_scroll_attempts: usize,
    pub stagnation_limit: usize,
    /// Pause after each scroll before re-reading the page.
    pub scroll_wait: Duration,
    pub ready_timeout: Duration,
    /// Scroll step as a share of the viewport height.
    pub scroll_fraction: f64,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            target_count: TARGET_UNIQUE,
            max_scroll_attempts: MAX_SCROLLS,
            stagnation_limit: STAGNANT_LIMIT,
            scroll_wait: Duration::from_secs(SCROLL_WAIT_SECS),
            ready_timeout: Duration::from_secs(READY_TIMEOUT_SECS),
            scroll_fraction: SCROLL_FRACTION,
        }
    }
}

/// Where the items live in the target page's markup.
#[derive(Debug)]
pub struct SiteProfile {
    pub link_selector: String,
    pub name: FieldChain,
    pub discount: FieldChain,
    pub price: FieldChain,
}

impl SiteProfile {
    pub fn from_selectors<S: AsRef<str>>(link: &str, names: &[S], discounts: &[S], prices: &[S]) -> Self {
        Self {
            link_selector: link.to_string(),
            name: FieldChain::css(names),
            discount: FieldChain::css(discounts),
            price: FieldChain::css(prices),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::from_selectors(LINK_SELECTOR, NAME_SELECTORS, DISCOUNT_SELECTORS, PRICE_SELECTORS)
    }
}

/* ---------------- State ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateBackend {
    /// One JSON file per key under this directory.
    Files(PathBuf),
    /// `crawler_state` table in this SQLite database.
    Sqlite(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateOptions {
    pub key: String,
    pub backend: StateBackend,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STATE_KEY.to_string(),
            backend: StateBackend::Files(PathBuf::from(STORE_DIR).join(STATE_SUBDIR)),
        }
    }
}

/* ---------------- Export ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub data_dir: PathBuf,
    pub format: ExportFormat,
    /// Write (and mail) a full snapshot table every run.
    pub save_snapshots: bool,
    /// Newest snapshot files to keep; 0 keeps everything.
    pub keep_snapshots: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_OUT_DIR),
            format: ExportFormat::Csv,
            save_snapshots: false,
            keep_snapshots: KEEP_SNAPSHOT_FILES,
        }
    }
}

impl ExportOptions {
    pub fn changes_dir(&self) -> PathBuf {
        self.data_dir.join(CHANGES_SUBDIR)
    }

    /// `<data_dir>/snapshot_<stem>.<ext>`
    pub fn snapshot_path(&self, stem: &str) -> PathBuf {
        join_dir_and_filename(&self.data_dir, &format!("{SNAPSHOT_PREFIX}{stem}.{}", self.format.ext()))
    }

    /// `<data_dir>/price_changes/price_change_<stem>.<ext>`
    pub fn change_path(&self, stem: &str) -> PathBuf {
        join_dir_and_filename(&self.changes_dir(), &format!("{CHANGE_PREFIX}{stem}.{}", self.format.ext()))
    }
}

fn join_dir_and_filename(dir: &Path, file_name: &str) -> PathBuf {
    if dir.as_os_str().is_empty() { PathBuf::from(file_name) } else { dir.join(file_name) }
}

/* ---------------- Notifications ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifyOptions {
    /// Change alerts and error reports.
    pub alert_to: Vec<String>,
    /// Full snapshot reports.
    pub snapshot_to: Vec<String>,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: Option<String>,
    /// Log messages instead of sending them.
    pub dry_run: bool,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            alert_to: Vec::new(),
            snapshot_to: Vec::new(),
            smtp_server: SMTP_SERVER.to_string(),
            smtp_port: SMTP_PORT,
            smtp_user: String::new(),
            smtp_password: None,
            dry_run: false,
        }
    }
}

/// `"a@x, b@y,,"` → `["a@x", "b@y"]`
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/* ---------------- Browser ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserOptions {
    /// chromedriver (or any W3C WebDriver) base URL.
    pub endpoint: String,
    pub browser_binary: Option<String>,
    pub headless: bool,
    pub window: (u32, u32),
    pub page_load_timeout: Duration,
    /// Per-command HTTP timeout against the driver.
    pub command_timeout: Duration,
    /// Pause between first load and the reload.
    pub warmup: Duration,
    /// Pause after the reload before collection starts.
    pub load_settle: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            endpoint: WEBDRIVER_URL.to_string(),
            browser_binary: None,
            headless: true,
            window: WINDOW_SIZE,
            page_load_timeout: Duration::from_secs(PAGE_LOAD_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(COMMAND_TIMEOUT_SECS),
            warmup: Duration::from_secs(NAVIGATE_WARMUP_SECS),
            load_settle: Duration::from_secs(LOAD_SETTLE_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RunConfig {
        let mut cfg = RunConfig::default();
        cfg.notify.alert_to = vec!["ops@example.com".into()];
        cfg.notify.smtp_user = "bot@example.com".into();
        cfg.notify.smtp_password = Some("secret".into());
        cfg
    }

    #[test]
    fn defaults_plus_credentials_validate() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn missing_password_is_configuration_error() {
        let mut cfg = valid();
        cfg.notify.smtp_password = Some(String::new());
        assert!(matches!(cfg.validate(), Err(HarvestError::ConfigurationMissing(_))));

        cfg.notify.dry_run = true;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_budgets_rejected() {
        let mut cfg = valid();
        cfg.collect.stagnation_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn recipients_drop_blanks() {
        assert_eq!(parse_recipients(" a@x.com, ,b@y.com,"), vec!["a@x.com", "b@y.com"]);
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn artifact_paths() {
        let export = ExportOptions { data_dir: PathBuf::from("out"), ..ExportOptions::default() };
        assert_eq!(export.snapshot_path("20261016_090000"), PathBuf::from("out/snapshot_20261016_090000.csv"));
        assert_eq!(
            export.change_path("20261016_090000"),
            PathBuf::from("out").join("price_changes").join("price_change_20261016_090000.csv")
        );
    }
}
