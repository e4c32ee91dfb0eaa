// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persistence capability contracts, independent of storage technology.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::errors::PersistenceError;
use crate::persistence::{BulkRecord, CausalEntry};

/// Atomic single-object store.
///
/// `load` never observes a partially written object; a failed `save` leaves
/// the previously committed object untouched.
pub trait ObjectStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been committed yet.
    fn load(&self) -> Result<Option<Value>, PersistenceError>;

    fn save(&self, value: &Value) -> Result<(), PersistenceError>;

    /// Canonical location of the stored object
    fn location(&self) -> &Path;
}

/// Typed helpers over any [`ObjectStore`].
pub trait ObjectStoreExt: ObjectStore {
    fn load_as<T: DeserializeOwned>(&self) -> Result<Option<T>, PersistenceError> {
        match self.load()? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PersistenceError::serialization(self.location(), e)),
            None => Ok(None),
        }
    }

    fn save_as<T: Serialize>(&self, value: &T) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(value)
            .map_err(|e| PersistenceError::serialization(self.location(), e))?;
        self.save(&value)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStoreExt for S {}

/// Append-only log of causal entries.
///
/// Prior entries are never rewritten; reads return insertion order.
pub trait LogStore: Send + Sync {
    fn append(&self, entries: &[CausalEntry]) -> Result<(), PersistenceError>;

    fn read_all(&self) -> Result<Vec<CausalEntry>, PersistenceError>;

    /// Entries whose timestamp lies in `[start, end]`, in insertion order.
    fn read_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CausalEntry>, PersistenceError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.timestamp >= start && entry.timestamp <= end)
            .collect())
    }
}

/// Bulk store for large ordered batches of timestamped records.
pub trait BulkStore: Send + Sync {
    fn append_batch(&self, records: Vec<BulkRecord>) -> Result<(), PersistenceError>;

    /// First and last timestamp of the contiguous stored coverage, if any.
    fn coverage(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, PersistenceError>;

    fn load_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BulkRecord>, PersistenceError>;
}
