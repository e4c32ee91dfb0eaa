// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

use crate::errors::PersistenceError;
use crate::persistence::BulkRecord;
use crate::traits::BulkStore;

/// Reference [`BulkStore`] holding records in memory, ordered by timestamp.
#[derive(Default)]
pub struct InMemoryBulkStore {
    records: Mutex<Vec<BulkRecord>>,
}

impl InMemoryBulkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BulkStore for InMemoryBulkStore {
    fn append_batch(&self, mut batch: Vec<BulkRecord>) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.append(&mut batch);
        // Stable: records sharing a timestamp keep arrival order.
        records.sort_by_key(|r| r.timestamp);
        Ok(())
    }

    fn coverage(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, PersistenceError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .first()
            .zip(records.last())
            .map(|(first, last)| (first.timestamp, last.timestamp)))
    }

    fn load_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BulkRecord>, PersistenceError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect())
    }
}
