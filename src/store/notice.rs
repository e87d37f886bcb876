//! User-facing notifications.
//!
//! Store operations never fail on persistence problems; they record a
//! notice instead and carry on with the in-memory state. The CLI prints
//! the notices after each command (or embeds them in JSON output).

use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// What a notice is about. Lets callers react to a reset without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Created,
    Updated,
    Deleted,
    NotFound,
    DataReset,
    SaveFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered log of notices produced since the last [`Notices::drain`].
#[derive(Debug, Default)]
pub struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Success => info!(?kind, "{message}"),
            NoticeLevel::Warning => warn!(?kind, "{message}"),
            NoticeLevel::Error => error!(?kind, "{message}"),
        }
        self.entries.push(Notice {
            level,
            kind,
            message,
        });
    }

    pub fn success(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.push(NoticeLevel::Success, kind, message);
    }

    pub fn warning(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, kind, message);
    }

    pub fn error(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.push(NoticeLevel::Error, kind, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, kind: NoticeKind) -> bool {
        self.entries.iter().any(|n| n.kind == kind)
    }

    /// Take all notices, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut notices = Notices::new();
        notices.success(NoticeKind::Created, "Business \"Acme\" created");
        notices.warning(NoticeKind::DataReset, "reset");
        assert_eq!(notices.len(), 2);
        assert!(notices.contains(NoticeKind::DataReset));

        let drained = notices.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].level, NoticeLevel::Warning);
        assert!(notices.is_empty());
    }
}
