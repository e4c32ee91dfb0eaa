// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use thiserror::Error;

use crate::errors::PersistenceError;
use crate::traits::Capability;

/// Error returned by a worker implementation.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    #[error("Event '{0}' is not declared in this worker's publishes")]
    UndeclaredEvent(String),

    #[error("Capability '{0}' is not attached")]
    CapabilityMissing(Capability),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    Failed(String),
}

/// A worker failure surfaced by an operator, with its causal context.
#[derive(Debug, Error)]
#[error("Worker '{worker_id}' failed in operator '{operator_id}': {source}")]
pub struct WorkerExecutionError {
    pub operator_id: String,
    pub worker_id: String,
    /// The input the worker was handed when it failed
    pub input: Value,
    #[source]
    pub source: WorkerError,
}

/// Error returned by an event bus handler. Logged by the bus, never propagated.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Dispatch channel for '{0}' is closed")]
    ChannelClosed(String),

    #[error("{0}")]
    Failed(String),
}

/// Failure of one adapter invocation. Logged by the dispatch loop; the
/// adapter publishes no result event for it.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Pipeline(#[from] WorkerExecutionError),

    #[error("Worker '{worker_id}' failed in method '{method}': {source}")]
    Worker {
        worker_id: String,
        method: String,
        #[source]
        source: WorkerError,
    },

    #[error("Invocation panicked: {0}")]
    Panicked(String),
}
