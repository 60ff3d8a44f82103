// src/config/consts.rs

// Target
pub const DEFAULT_TARGET_URL: &str = "https://zigzag.kr/search?keyword=%EC%9B%8C%EB%84%88%EB%A7%88%EC%9D%B8";

// Site markup (generated class names; expect these to drift)
pub const LINK_SELECTOR: &str = "a.css-1pjr9xx.product-card-link";
pub const NAME_SELECTORS: &[&str] = &[".zds4_1kdomrc", ".zds4_1kdomra"];
pub const DISCOUNT_SELECTORS: &[&str] = &[".zds4_1jsf80i2"];
pub const PRICE_SELECTORS: &[&str] = &[".zds4_1jsf80i3"];

// Collection
pub const TARGET_UNIQUE: usize = 500;
pub const SCROLL_WAIT_SECS: u64 = 5;
pub const MAX_SCROLLS: usize = 250;
pub const STAGNANT_LIMIT: usize = 50;
pub const READY_TIMEOUT_SECS: u64 = 20;
pub const SCROLL_FRACTION: f64 = 0.9;

// Browser
pub const WEBDRIVER_URL: &str = "http://localhost:9515";
pub const WINDOW_SIZE: (u32, u32) = (1200, 900);
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 60;
pub const COMMAND_TIMEOUT_SECS: u64 = 90;
pub const NAVIGATE_WARMUP_SECS: u64 = 2;
pub const LOAD_SETTLE_SECS: u64 = 5;

// Local state
pub const STORE_DIR: &str = ".store";
pub const STATE_SUBDIR: &str = "state";
pub const LOG_FILE: &str = "debug.log";
pub const DEFAULT_STATE_KEY: &str = "zigzag:wannamine";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const CHANGES_SUBDIR: &str = "price_changes";
pub const SNAPSHOT_PREFIX: &str = "snapshot_";
pub const CHANGE_PREFIX: &str = "price_change_";
pub const KEEP_SNAPSHOT_FILES: usize = 48;

// Mail
pub const SMTP_SERVER: &str = "smtp.worksmobile.com";
pub const SMTP_PORT: u16 = 465;
