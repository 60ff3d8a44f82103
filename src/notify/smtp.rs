// src/notify/smtp.rs
use std::fs;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message as Email, SmtpTransport, Transport};

use crate::config::options::NotifyOptions;
use crate::error::HarvestError;

use super::{Message, Notifier};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// SMTP over implicit TLS, authenticated as the sending account.
pub struct SmtpNotifier {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    /// Fails with `ConfigurationMissing` when the account or password is absent.
    pub fn new(opts: &NotifyOptions) -> Result<Self, HarvestError> {
        let missing = |what: &str| HarvestError::ConfigurationMissing(what.to_string());

        let user = opts.smtp_user.trim();
        if user.is_empty() {
            return Err(missing("SMTP_USER is empty"));
        }
        let password = match opts.smtp_password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Err(missing("SMTP_PASSWORD is empty")),
        };

        let from: Mailbox = user
            .parse()
            .map_err(|e| HarvestError::ConfigurationMissing(format!("SMTP_USER is not an address: {e}")))?;

        let transport = SmtpTransport::relay(&opts.smtp_server)
            .map_err(|e| HarvestError::ConfigurationMissing(format!("SMTP server {}: {e}", opts.smtp_server)))?
            .port(opts.smtp_port)
            .credentials(Credentials::new(user.to_string(), password))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { from, transport })
    }

    fn build(&self, msg: &Message) -> Result<Email, HarvestError> {
        let failed = |e: &dyn std::fmt::Display| HarvestError::NotifyFailed(e.to_string());

        let mut builder = Email::builder().from(self.from.clone()).subject(msg.subject.clone());
        for to in &msg.recipients {
            let mb: Mailbox = to.parse().map_err(|e| HarvestError::NotifyFailed(format!("bad recipient {to}: {e}")))?;
            builder = builder.to(mb);
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(msg.html_body.clone()));
        let octets = ContentType::parse("application/octet-stream").map_err(|e| failed(&e))?;
        for path in &msg.attachments {
            let bytes = match fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    logw!("Notify: skipping attachment {}: {e}", path.display());
                    continue;
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            body = body.singlepart(Attachment::new(name).body(bytes, octets.clone()));
        }

        builder.multipart(body).map_err(|e| failed(&e))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, msg: &Message) -> Result<(), HarvestError> {
        if msg.recipients.is_empty() {
            logd!("Notify: no recipients for {:?}; not sent", msg.subject);
            return Ok(());
        }
        let email = self.build(msg)?;
        self.transport
            .send(&email)
            .map_err(|e| HarvestError::NotifyFailed(e.to_string()))?;
        logf!("Notify: sent {:?} to {}", msg.subject, msg.recipients.join(","));
        Ok(())
    }
}
