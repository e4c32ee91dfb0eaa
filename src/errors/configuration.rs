// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fatal boot-time errors.
//!
//! A `ConfigurationError` always aborts the boot sequence before the scheduler
//! starts. Every variant names the offending worker, operator, rule or schedule
//! so the report is actionable without a stack trace.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::{AggregationStrategy, ExecutionStrategy};
use crate::errors::{EventChainValidationError, PersistenceError};
use crate::traits::{Capability, WorkerKind};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Declared role and the implementation's structural role disagree.
    #[error("Worker '{worker_id}' declares role {declared} but implementation '{implementation}' is a {actual} worker")]
    RoleMismatch {
        worker_id: String,
        implementation: String,
        declared: WorkerKind,
        actual: WorkerKind,
    },

    #[error("Worker '{worker_id}' declares the EVENT_DRIVEN role without enabling the 'events' capability")]
    MissingEventsCapability { worker_id: String },

    #[error("Worker '{worker_id}' enables the '{capability}' capability but implementation '{implementation}' does not support it")]
    CapabilityNotSupported {
        worker_id: String,
        implementation: String,
        capability: Capability,
    },

    #[error("Worker '{worker_id}' references unknown implementation '{implementation}'")]
    UnknownImplementation {
        worker_id: String,
        implementation: String,
    },

    #[error("Failed to create worker '{worker_id}' from implementation '{implementation}': {reason}")]
    WorkerCreationFailed {
        worker_id: String,
        implementation: String,
        reason: String,
    },

    #[error("Operator '{operator_id}' uses unsupported strategy combination {execution}/{aggregation}")]
    UnsupportedStrategy {
        operator_id: String,
        execution: ExecutionStrategy,
        aggregation: AggregationStrategy,
    },

    #[error("EVENT_DRIVEN operator '{operator_id}' was handed {count} pipeline worker(s); autonomous workers never join a pipeline")]
    EventDrivenOperatorWithWorkers { operator_id: String, count: usize },

    #[error("Duplicate worker ID: '{worker_id}'")]
    DuplicateWorkerId { worker_id: String },

    #[error("Duplicate operator ID: '{operator_id}'")]
    DuplicateOperatorId { operator_id: String },

    #[error("Wiring rule '{adapter_id}' targets unknown component '{target}'")]
    UnknownWiringTarget { adapter_id: String, target: String },

    #[error("Wiring rule '{adapter_id}' invokes unknown method '{method}' on '{target}'")]
    UnknownMethod {
        adapter_id: String,
        target: String,
        method: String,
    },

    /// An EVENT_DRIVEN operator has no pipeline to run.
    #[error("Wiring rule '{adapter_id}' targets EVENT_DRIVEN operator '{operator_id}', which runs no pipeline")]
    EventDrivenOperatorTarget { adapter_id: String, operator_id: String },

    #[error("Worker '{worker_id}' subscribes to '{event}' but exposes no method to deliver it to")]
    UndeliverableSubscription { worker_id: String, event: String },

    #[error("Schedule '{schedule}' is invalid: {reason}")]
    InvalidSchedule { schedule: String, reason: String },

    #[error("Event '{event}' is not defined")]
    UndefinedEvent { event: String },

    #[error("Could not prepare '{capability}' capability for worker '{worker_id}': {source}")]
    Persistence {
        worker_id: String,
        capability: Capability,
        #[source]
        source: PersistenceError,
    },
}

/// Failure reading or parsing a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Anything that stops `bootstrap()` from producing a running system.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    EventChain(#[from] EventChainValidationError),
}
