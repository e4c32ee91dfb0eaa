// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::WorkerError;
use crate::events::Event;
use crate::traits::capability::{EventEmittingWorker, HistoryWritingWorker, StatefulWorker};

/// The structural role a worker plays.
///
/// * `Standard` - pipeline-participating, invoked by an operator
/// * `EventDriven` - autonomous, invoked only through event wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerKind {
    Standard,
    EventDriven,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Standard => write!(f, "STANDARD"),
            WorkerKind::EventDriven => write!(f, "EVENT_DRIVEN"),
        }
    }
}

/// Base contract shared by every worker implementation.
///
/// The `as_*_mut` hooks are how an implementation advertises a capability
/// interface. The workforce builder calls them once, before the worker is
/// shared, to attach the capability handles the descriptor enables.
pub trait Worker: Send + Sync {
    fn name(&self) -> &'static str;

    fn as_stateful_mut(&mut self) -> Option<&mut dyn StatefulWorker> {
        None
    }

    fn as_event_emitting_mut(&mut self) -> Option<&mut dyn EventEmittingWorker> {
        None
    }

    fn as_history_writing_mut(&mut self) -> Option<&mut dyn HistoryWritingWorker> {
        None
    }
}

/// Pipeline-participating worker: `process(input) -> output`.
#[async_trait]
pub trait StandardWorker: Worker {
    async fn process(&self, input: Value) -> Result<Value, WorkerError>;
}

/// Autonomous worker exposing named methods that wiring rules invoke.
#[async_trait]
pub trait EventDrivenWorker: Worker {
    /// Method names wiring rules may target
    fn methods(&self) -> &'static [&'static str];

    /// Invoke `method` in reaction to `event`. `Some(value)` becomes the
    /// payload of the rule's result event, if the rule declares one.
    async fn invoke(&self, method: &str, event: &Event) -> Result<Option<Value>, WorkerError>;
}

/// A freshly constructed worker, tagged with its implementation's role.
pub enum WorkerImpl {
    Standard(Box<dyn StandardWorker>),
    EventDriven(Box<dyn EventDrivenWorker>),
}

impl WorkerImpl {
    pub fn kind(&self) -> WorkerKind {
        match self {
            WorkerImpl::Standard(_) => WorkerKind::Standard,
            WorkerImpl::EventDriven(_) => WorkerKind::EventDriven,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkerImpl::Standard(worker) => worker.name(),
            WorkerImpl::EventDriven(worker) => worker.name(),
        }
    }

    pub fn as_stateful_mut(&mut self) -> Option<&mut dyn StatefulWorker> {
        match self {
            WorkerImpl::Standard(worker) => worker.as_stateful_mut(),
            WorkerImpl::EventDriven(worker) => worker.as_stateful_mut(),
        }
    }

    pub fn as_event_emitting_mut(&mut self) -> Option<&mut dyn EventEmittingWorker> {
        match self {
            WorkerImpl::Standard(worker) => worker.as_event_emitting_mut(),
            WorkerImpl::EventDriven(worker) => worker.as_event_emitting_mut(),
        }
    }

    pub fn as_history_writing_mut(&mut self) -> Option<&mut dyn HistoryWritingWorker> {
        match self {
            WorkerImpl::Standard(worker) => worker.as_history_writing_mut(),
            WorkerImpl::EventDriven(worker) => worker.as_history_writing_mut(),
        }
    }
}

impl fmt::Debug for WorkerImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerImpl")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
