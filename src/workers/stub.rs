// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker doubles for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::WorkerError;
use crate::events::{current_causal_ids, Event};
use crate::traits::{EventDrivenWorker, EventEmittingWorker, StandardWorker, Worker};
use crate::workers::EventEmitter;

/// Returns a fixed value, optionally after a delay.
pub struct StaticWorker {
    value: Value,
    delay: Duration,
}

impl StaticWorker {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(value: Value, delay: Duration) -> Self {
        Self { value, delay }
    }
}

impl Worker for StaticWorker {
    fn name(&self) -> &'static str {
        "static"
    }
}

#[async_trait]
impl StandardWorker for StaticWorker {
    async fn process(&self, _input: Value) -> Result<Value, WorkerError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.value.clone())
    }
}

/// Always fails, counting how often it was called.
#[derive(Default)]
pub struct FailingWorker {
    pub calls: Arc<AtomicUsize>,
}

impl FailingWorker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worker for FailingWorker {
    fn name(&self) -> &'static str {
        "failing"
    }
}

#[async_trait]
impl StandardWorker for FailingWorker {
    async fn process(&self, _input: Value) -> Result<Value, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(WorkerError::Failed("simulated worker failure".into()))
    }
}

pub struct PanickingWorker;

impl Worker for PanickingWorker {
    fn name(&self) -> &'static str {
        "panicking"
    }
}

#[async_trait]
impl StandardWorker for PanickingWorker {
    async fn process(&self, _input: Value) -> Result<Value, WorkerError> {
        panic!("simulated worker panic")
    }
}

/// Records every input it sees and echoes it back.
#[derive(Default)]
pub struct RecordingWorker {
    pub seen: Arc<Mutex<Vec<Value>>>,
}

impl Worker for RecordingWorker {
    fn name(&self) -> &'static str {
        "recording"
    }
}

#[async_trait]
impl StandardWorker for RecordingWorker {
    async fn process(&self, input: Value) -> Result<Value, WorkerError> {
        self.seen.lock().unwrap().push(input.clone());
        Ok(input)
    }
}

/// Returns the causal ids in scope while it runs.
pub struct LineageWorker;

impl Worker for LineageWorker {
    fn name(&self) -> &'static str {
        "lineage"
    }
}

#[async_trait]
impl StandardWorker for LineageWorker {
    async fn process(&self, _input: Value) -> Result<Value, WorkerError> {
        serde_json::to_value(current_causal_ids()).map_err(|e| WorkerError::Failed(e.to_string()))
    }
}

/// Event-driven worker. `echo` returns the payload, `fail` always errors.
#[derive(Default)]
pub struct EchoListener {
    pub seen: Arc<Mutex<Vec<String>>>,
    pub emitter: Option<EventEmitter>,
}

impl Worker for EchoListener {
    fn name(&self) -> &'static str {
        "echo_listener"
    }

    fn as_event_emitting_mut(&mut self) -> Option<&mut dyn EventEmittingWorker> {
        Some(self)
    }
}

impl EventEmittingWorker for EchoListener {
    fn attach_emitter(&mut self, emitter: EventEmitter) {
        self.emitter = Some(emitter);
    }
}

#[async_trait]
impl EventDrivenWorker for EchoListener {
    fn methods(&self) -> &'static [&'static str] {
        &["echo", "fail"]
    }

    async fn invoke(&self, method: &str, event: &Event) -> Result<Option<Value>, WorkerError> {
        self.seen.lock().unwrap().push(event.name.clone());
        match method {
            "echo" => Ok(Some(event.payload.clone())),
            "fail" => Err(WorkerError::Failed("listener failure".into())),
            other => Err(WorkerError::UnknownMethod(other.to_string())),
        }
    }
}
