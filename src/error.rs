// src/error.rs
use std::time::Duration;

/// Every condition a run can hit.
///
/// Only the fatal ones (see [`HarvestError::is_fatal`]) abort a run. The rest
/// are recovered where they happen: a stale element skips one item, a failed
/// notification is logged.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// The item-link selector never matched within the ready timeout.
    #[error("page not ready: no element matched `{selector}` within {timeout:?}")]
    PageNotReady { selector: String, timeout: Duration },

    /// An element changed under us between reads.
    #[error("stale element: {0}")]
    ElementStale(String),

    /// A required secret, credential or setting is absent.
    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    /// The state store could not be read or written.
    #[error("state store unavailable: {0}")]
    StorageUnavailable(String),

    /// Sending a notification failed.
    #[error("notification failed: {0}")]
    NotifyFailed(String),

    /// The browser session itself is broken (driver down, protocol error).
    #[error("browser session error: {0}")]
    Browser(String),
}

impl HarvestError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PageNotReady { .. }
                | Self::ConfigurationMissing(_)
                | Self::StorageUnavailable(_)
                | Self::Browser(_)
        )
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::ElementStale(_))
    }

    pub(crate) fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(format!("{context}: {err}"))
    }
}

impl From<rusqlite::Error> for HarvestError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_run_breaking_conditions_are_fatal() {
        assert!(HarvestError::PageNotReady { selector: "a".into(), timeout: Duration::from_secs(1) }.is_fatal());
        assert!(HarvestError::ConfigurationMissing("smtp".into()).is_fatal());
        assert!(HarvestError::StorageUnavailable("db".into()).is_fatal());
        assert!(HarvestError::Browser("gone".into()).is_fatal());

        assert!(!HarvestError::ElementStale("el".into()).is_fatal());
        assert!(!HarvestError::NotifyFailed("smtp".into()).is_fatal());
    }
}
