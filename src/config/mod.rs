// src/config/mod.rs
pub mod consts;
pub mod options;

pub use options::{
    BrowserOptions, CollectOptions, ExportFormat, ExportOptions, NotifyOptions, RunConfig,
    SiteProfile, StateBackend, StateOptions,
};
