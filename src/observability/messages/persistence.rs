// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for durable stores.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// A leftover temp file from an interrupted write was found on load.
///
/// # Log Level
/// `warn!` - Recovery performed, prior write may have been lost
///
/// # Example
/// ```
/// use std::path::Path;
/// use the_foreman::observability::messages::persistence::StoreRecovered;
///
/// let msg = StoreRecovered {
///     path: Path::new("/var/lib/foreman/state/ops/momentum.json"),
///     action: "promoted",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct StoreRecovered<'a> {
    pub path: &'a Path,
    pub action: &'a str,
}

impl Display for StoreRecovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Recovered interrupted write for '{}': temp file {}",
            self.path.display(),
            self.action
        )
    }
}

impl StructuredLog for StoreRecovered<'_> {
    fn log(&self) {
        tracing::warn!(
            path = %self.path.display(),
            action = self.action,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("store_recovery", span_name = name, path = %self.path.display())
    }
}

/// A store write failed; the previous contents remain in place.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StoreWriteFailed<'a> {
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for StoreWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Write to '{}' failed: {}", self.path.display(), self.error)
    }
}

impl StructuredLog for StoreWriteFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = %self.path.display(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("store_write_failed", span_name = name, path = %self.path.display())
    }
}

pub struct JournalAppended<'a> {
    pub path: &'a Path,
    pub event_type: &'a str,
    pub entry_count: usize,
}

impl Display for JournalAppended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Journal '{}' appended '{}' ({} entries)",
            self.path.display(),
            self.event_type,
            self.entry_count
        )
    }
}

impl StructuredLog for JournalAppended<'_> {
    fn log(&self) {
        tracing::trace!(
            path = %self.path.display(),
            event_type = self.event_type,
            entry_count = self.entry_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("journal", span_name = name, path = %self.path.display())
    }
}
