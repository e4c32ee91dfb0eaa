// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker construction and execution events.
//!
//! This module contains message types for logging events related to:
//! * Worker construction and classification
//! * Capability attachment
//! * Worker execution lifecycle (start, completion, failure)

use crate::observability::messages::StructuredLog;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker constructed and classified.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foreman::observability::messages::worker::WorkerConstructed;
///
/// let msg = WorkerConstructed {
///     worker_id: "momentum",
///     implementation: "add",
///     kind: "STANDARD",
///     capabilities: "state,events",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkerConstructed<'a> {
    pub worker_id: &'a str,
    pub implementation: &'a str,
    pub kind: &'a str,
    pub capabilities: &'a str,
}

impl Display for WorkerConstructed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' constructed from '{}' as {} with capabilities [{}]",
            self.worker_id, self.implementation, self.kind, self.capabilities
        )
    }
}

impl StructuredLog for WorkerConstructed<'_> {
    fn log(&self) {
        tracing::info!(
            worker_id = self.worker_id,
            implementation = self.implementation,
            kind = self.kind,
            capabilities = self.capabilities,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_construction",
            span_name = name,
            worker_id = self.worker_id,
            implementation = self.implementation,
        )
    }
}

/// Worker construction failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerConstructionFailed<'a> {
    pub worker_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerConstructionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}' construction failed: {}", self.worker_id, self.error)
    }
}

impl StructuredLog for WorkerConstructionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            worker_id = self.worker_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_construction_failed", span_name = name, worker_id = self.worker_id)
    }
}

pub struct CapabilityAttached<'a> {
    pub worker_id: &'a str,
    pub capability: &'a str,
}

impl Display for CapabilityAttached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Attached '{}' capability to worker '{}'", self.capability, self.worker_id)
    }
}

impl StructuredLog for CapabilityAttached<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            capability = self.capability,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "capability",
            span_name = name,
            worker_id = self.worker_id,
            capability = self.capability,
        )
    }
}

/// Worker execution completed successfully.
///
/// # Log Level
/// `debug!` - Per-invocation detail
pub struct WorkerExecutionCompleted<'a> {
    pub operator_id: &'a str,
    pub worker_id: &'a str,
    pub duration: std::time::Duration,
}

impl Display for WorkerExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' in '{}' completed in {:?}",
            self.worker_id, self.operator_id, self.duration
        )
    }
}

impl StructuredLog for WorkerExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            operator_id = self.operator_id,
            worker_id = self.worker_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_execution",
            span_name = name,
            operator_id = self.operator_id,
            worker_id = self.worker_id,
        )
    }
}

/// Worker execution failed.
///
/// Carries the full causal context: which operator, which worker, what input.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_foreman::observability::messages::worker::WorkerExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let input = serde_json::json!({"price": 10});
/// let msg = WorkerExecutionFailed {
///     operator_id: "signal_detection",
///     worker_id: "momentum",
///     input: &input,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct WorkerExecutionFailed<'a> {
    pub operator_id: &'a str,
    pub worker_id: &'a str,
    pub input: &'a Value,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' in '{}' failed on input {}: {}",
            self.worker_id, self.operator_id, self.input, self.error
        )
    }
}

impl StructuredLog for WorkerExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            operator_id = self.operator_id,
            worker_id = self.worker_id,
            input = %self.input,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_failure",
            span_name = name,
            operator_id = self.operator_id,
            worker_id = self.worker_id,
        )
    }
}
