// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::errors::WorkerError;
use crate::persistence::OperationalState;
use crate::traits::{
    Capability, EventEmittingWorker, StandardWorker, StatefulWorker, Worker,
};
use crate::workers::{BuildContext, EventEmitter, StateHandle};

const TOTAL_KEY: &str = "total";

/// Adds each numeric input to a persisted total and returns the new total.
///
/// Needs the `state` capability. With `events` enabled it also emits its
/// first declared `publishes` event carrying `{"total": <n>}`.
pub struct RunningTotal {
    unit_id: String,
    result_event: Option<String>,
    state: Option<StateHandle>,
    emitter: Option<EventEmitter>,
    write_lock: Mutex<()>,
}

impl RunningTotal {
    pub fn from_context(ctx: &BuildContext<'_>) -> Self {
        Self {
            unit_id: ctx.unit_id.to_string(),
            result_event: ctx.published_events().into_iter().next(),
            state: None,
            emitter: None,
            write_lock: Mutex::new(()),
        }
    }

    async fn accumulate(&self, amount: f64) -> Result<f64, WorkerError> {
        let state = self
            .state
            .as_ref()
            .ok_or(WorkerError::CapabilityMissing(Capability::State))?;

        let _guard = self.write_lock.lock().await;
        let mut ledger = state
            .load_as::<OperationalState>()
            .await?
            .unwrap_or_else(|| OperationalState::new(&self.unit_id));
        let total = ledger.accumulate(TOTAL_KEY, amount);
        state.commit_as(&ledger).await?;
        Ok(total)
    }
}

impl Worker for RunningTotal {
    fn name(&self) -> &'static str {
        "running_total"
    }

    fn as_stateful_mut(&mut self) -> Option<&mut dyn StatefulWorker> {
        Some(self)
    }

    fn as_event_emitting_mut(&mut self) -> Option<&mut dyn EventEmittingWorker> {
        Some(self)
    }
}

impl StatefulWorker for RunningTotal {
    fn attach_state(&mut self, state: StateHandle) {
        self.state = Some(state);
    }
}

impl EventEmittingWorker for RunningTotal {
    fn attach_emitter(&mut self, emitter: EventEmitter) {
        self.emitter = Some(emitter);
    }
}

#[async_trait]
impl StandardWorker for RunningTotal {
    async fn process(&self, input: Value) -> Result<Value, WorkerError> {
        let amount = input
            .as_f64()
            .ok_or_else(|| WorkerError::InvalidInput(format!("running_total expects a number, got {}", input)))?;

        let total = self.accumulate(amount).await?;

        // inherits the triggering event's causal ids
        if let (Some(emitter), Some(event)) = (&self.emitter, &self.result_event) {
            emitter.emit(event, json!({ TOTAL_KEY: total }), Vec::new())?;
        }
        Ok(json!(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{causal_scope, CausalId, CausalKind, EventBus};
    use crate::persistence::AtomicFileStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn worker() -> RunningTotal {
        RunningTotal {
            unit_id: "unit".into(),
            result_event: Some("total_updated".into()),
            state: None,
            emitter: None,
            write_lock: Mutex::new(()),
        }
    }

    #[tokio::test]
    async fn requires_state() {
        let error = worker().process(json!(1)).await.unwrap_err();
        assert!(matches!(error, WorkerError::CapabilityMissing(Capability::State)));
    }

    #[tokio::test]
    async fn total_survives_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("total.json");

        let mut first = worker();
        first.attach_state(StateHandle::new(Arc::new(AtomicFileStore::open(&path))));
        first.process(json!(2)).await.unwrap();
        first.process(json!(3)).await.unwrap();

        let mut second = worker();
        second.attach_state(StateHandle::new(Arc::new(AtomicFileStore::open(&path))));
        assert_eq!(second.process(json!(4)).await.unwrap(), json!(9.0));
    }

    #[tokio::test]
    async fn emits_declared_event() {
        let dir = TempDir::new().unwrap();
        let bus = EventBus::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe_fn("total_updated", "sink", move |e| {
            sink.lock().unwrap().push((e.payload.clone(), e.causal_ids.clone()));
            Ok(())
        });

        let mut total = worker();
        total.attach_state(StateHandle::new(Arc::new(AtomicFileStore::open(
            dir.path().join("t.json"),
        ))));
        total.attach_emitter(EventEmitter::new(bus, "ledger", vec!["total_updated".to_string()]));
        let origin = CausalId::new(CausalKind::WorkItem);
        causal_scope(vec![origin], total.process(json!(5))).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(json!({"total": 5.0}), vec![origin])]);
    }
}
