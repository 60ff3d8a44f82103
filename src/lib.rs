// src/lib.rs

#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;

pub mod collect;
pub mod csv;
pub mod diff;
pub mod file;
pub mod notify;
pub mod page;
pub mod progress;
pub mod runner;
pub mod snapshot;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::HarvestError;
