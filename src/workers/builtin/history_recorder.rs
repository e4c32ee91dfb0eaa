// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::WorkerError;
use crate::events::Event;
use crate::persistence::CausalEntry;
use crate::traits::{
    Capability, EventDrivenWorker, EventEmittingWorker, HistoryWritingWorker, Worker,
};
use crate::workers::{BuildContext, EventEmitter, HistoryWriter};

const METHODS: &[&str] = &["record", "replay"];

/// Autonomous worker that journals the events it is wired to.
///
/// * `record` appends a [`CausalEntry`] carrying the event's name, causal ids
///   and payload, then returns the entry. With a declared `publishes` event it
///   also emits the entry.
/// * `replay` returns the full journal as an array.
pub struct HistoryRecorder {
    result_event: Option<String>,
    emitter: Option<EventEmitter>,
    history: Option<HistoryWriter>,
}

impl HistoryRecorder {
    pub fn from_context(ctx: &BuildContext<'_>) -> Self {
        Self {
            result_event: ctx.published_events().into_iter().next(),
            emitter: None,
            history: None,
        }
    }

    fn history(&self) -> Result<&HistoryWriter, WorkerError> {
        self.history
            .as_ref()
            .ok_or(WorkerError::CapabilityMissing(Capability::History))
    }

    async fn record(&self, event: &Event) -> Result<Value, WorkerError> {
        let entry = CausalEntry::new(
            event.name.clone(),
            event.causal_ids.clone(),
            event.payload.clone(),
        );
        self.history()?.append(vec![entry.clone()]).await?;

        let value = to_value(&entry)?;
        if let (Some(emitter), Some(result_event)) = (&self.emitter, &self.result_event) {
            emitter.emit(result_event, value.clone(), event.causal_ids.clone())?;
        }
        Ok(value)
    }

    async fn replay(&self) -> Result<Value, WorkerError> {
        to_value(&self.history()?.read_all().await?)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, WorkerError> {
    serde_json::to_value(value).map_err(|e| WorkerError::Failed(e.to_string()))
}

impl Worker for HistoryRecorder {
    fn name(&self) -> &'static str {
        "history_recorder"
    }

    fn as_event_emitting_mut(&mut self) -> Option<&mut dyn EventEmittingWorker> {
        Some(self)
    }

    fn as_history_writing_mut(&mut self) -> Option<&mut dyn HistoryWritingWorker> {
        Some(self)
    }
}

impl EventEmittingWorker for HistoryRecorder {
    fn attach_emitter(&mut self, emitter: EventEmitter) {
        self.emitter = Some(emitter);
    }
}

impl HistoryWritingWorker for HistoryRecorder {
    fn attach_history(&mut self, history: HistoryWriter) {
        self.history = Some(history);
    }
}

#[async_trait]
impl EventDrivenWorker for HistoryRecorder {
    fn methods(&self) -> &'static [&'static str] {
        METHODS
    }

    async fn invoke(&self, method: &str, event: &Event) -> Result<Option<Value>, WorkerError> {
        match method {
            "record" => self.record(event).await.map(Some),
            "replay" => self.replay().await.map(Some),
            other => Err(WorkerError::UnknownMethod(other.to_string())),
        }
    }
}
