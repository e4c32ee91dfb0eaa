// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability handles attached to workers after construction.
//!
//! A handle is the only way a worker reaches a persistor or the bus; workers
//! never see the stores or the registry directly.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::errors::{PersistenceError, WorkerError};
use crate::events::{current_causal_ids, CausalId, Event, EventBus};
use crate::persistence::CausalEntry;
use crate::traits::{LogStore, ObjectStore, ObjectStoreExt};

/// Access to the worker's own atomic single-object store.
///
/// Store calls block on file I/O and fsync, so each one runs on tokio's
/// blocking pool.
#[derive(Clone)]
pub struct StateHandle {
    store: Arc<dyn ObjectStore>,
}

impl StateHandle {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<Value>, PersistenceError> {
        let store = self.store.clone();
        off_executor(move || store.load()).await
    }

    pub async fn commit(&self, state: Value) -> Result<(), PersistenceError> {
        let store = self.store.clone();
        off_executor(move || store.save(&state)).await
    }

    pub async fn load_as<T>(&self) -> Result<Option<T>, PersistenceError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let store = self.store.clone();
        off_executor(move || store.load_as::<T>()).await
    }

    pub async fn commit_as<T: Serialize>(&self, state: &T) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(state)
            .map_err(|e| PersistenceError::serialization(self.store.location(), e))?;
        self.commit(value).await
    }
}

/// Publishes events on behalf of one worker.
///
/// Only events the worker declares in its `publishes` list may be emitted,
/// which keeps the validated event chain honest at runtime.
#[derive(Clone)]
pub struct EventEmitter {
    bus: EventBus,
    worker_id: String,
    declared: BTreeSet<String>,
}

impl EventEmitter {
    pub fn new(bus: EventBus, worker_id: impl Into<String>, declared: impl IntoIterator<Item = String>) -> Self {
        Self {
            bus,
            worker_id: worker_id.into(),
            declared: declared.into_iter().collect(),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Publish `name`. Empty `causal_ids` inherit the ids of the event being
    /// handled, if any.
    pub fn emit(&self, name: &str, payload: Value, causal_ids: Vec<CausalId>) -> Result<(), WorkerError> {
        if !self.declared.contains(name) {
            return Err(WorkerError::UndeclaredEvent(name.to_string()));
        }
        let causal_ids = if causal_ids.is_empty() {
            current_causal_ids()
        } else {
            causal_ids
        };
        self.bus
            .publish(&Event::new(name, payload).with_causal_ids(causal_ids));
        Ok(())
    }
}

/// Appends to and reads the unit's causal history journal.
#[derive(Clone)]
pub struct HistoryWriter {
    log: Arc<dyn LogStore>,
}

impl HistoryWriter {
    pub fn new(log: Arc<dyn LogStore>) -> Self {
        Self { log }
    }

    pub async fn append(&self, entries: Vec<CausalEntry>) -> Result<(), PersistenceError> {
        let log = self.log.clone();
        off_executor(move || log.append(&entries)).await
    }

    pub async fn read_all(&self) -> Result<Vec<CausalEntry>, PersistenceError> {
        let log = self.log.clone();
        off_executor(move || log.read_all()).await
    }

    pub async fn read_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CausalEntry>, PersistenceError> {
        let log = self.log.clone();
        off_executor(move || log.read_range(start, end)).await
    }
}

async fn off_executor<T, F>(call: F) -> Result<T, PersistenceError>
where
    F: FnOnce() -> Result<T, PersistenceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| PersistenceError::TaskFailed {
            reason: e.to_string(),
        })?
}
