// src/notify/mod.rs
//! Outbound notifications: change alerts, snapshot reports, error reports.
//!
//! A [`Notifier`] delivers one [`Message`]. Delivery failures come back as
//! `NotifyFailed`; the orchestrator logs them and carries on.

mod message;
mod smtp;

use std::path::PathBuf;

use crate::error::HarvestError;

pub use message::{change_alert, error_report, snapshot_report};
pub use smtp::SmtpNotifier;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
    /// Files to attach; ones that no longer exist are skipped at send time.
    pub attachments: Vec<PathBuf>,
}

impl Message {
    pub fn new(recipients: &[String], subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            recipients: recipients.to_vec(),
            subject: subject.into(),
            html_body: html_body.into(),
            attachments: Vec::new(),
        }
    }

    pub fn attach(mut self, path: Option<PathBuf>) -> Self {
        self.attachments.extend(path);
        self
    }
}

pub trait Notifier {
    fn send(&self, msg: &Message) -> Result<(), HarvestError>;
}

/// Logs messages instead of delivering them (`--dry-run`).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, msg: &Message) -> Result<(), HarvestError> {
        logf!(
            "Notify (dry run): to={} subject={:?} attachments={:?}",
            msg.recipients.join(","),
            msg.subject,
            msg.attachments
        );
        logd!("Notify (dry run) body:\n{}", msg.html_body);
        Ok(())
    }
}
