// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the persistence suite. Never swallowed by a store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on '{}': {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupted store '{}': {reason}", .path.display())]
    Corrupted { path: PathBuf, reason: String },

    /// The blocking task running a store call was cancelled or panicked.
    #[error("Persistence task did not complete: {reason}")]
    TaskFailed { reason: String },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        PersistenceError::Serialization {
            path: path.into(),
            source,
        }
    }
}
