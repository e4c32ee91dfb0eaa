// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for operator lifecycle, pipeline execution and system boot.
//!
//! This module contains message types for logging events related to:
//! * Operator construction and strategy selection
//! * Pipeline execution lifecycle (start, completion, abort)
//! * Parallel contribution omission
//! * Bootstrap, start and stop of a running system

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Operator constructed from configuration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foreman::observability::messages::engine::OperatorCreated;
///
/// let msg = OperatorCreated {
///     operator_id: "signal_detection",
///     execution: "PARALLEL",
///     aggregation: "COLLECT_ALL",
///     worker_count: 3,
///     pool_size: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct OperatorCreated<'a> {
    pub operator_id: &'a str,
    pub execution: &'a str,
    pub aggregation: &'a str,
    pub worker_count: usize,
    pub pool_size: usize,
}

impl Display for OperatorCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' created: {}/{} with {} workers, pool_size={}",
            self.operator_id, self.execution, self.aggregation, self.worker_count, self.pool_size
        )
    }
}

impl StructuredLog for OperatorCreated<'_> {
    fn log(&self) {
        tracing::info!(
            operator_id = self.operator_id,
            execution = self.execution,
            aggregation = self.aggregation,
            worker_count = self.worker_count,
            pool_size = self.pool_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "operator",
            span_name = name,
            operator_id = self.operator_id,
            execution = self.execution,
            aggregation = self.aggregation,
        )
    }
}

/// Pipeline execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foreman::observability::messages::engine::PipelineStarted;
///
/// let msg = PipelineStarted {
///     operator_id: "order_planning",
///     execution: "SEQUENTIAL",
///     worker_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelineStarted<'a> {
    pub operator_id: &'a str,
    pub execution: &'a str,
    pub worker_count: usize,
}

impl Display for PipelineStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' starting {} pipeline over {} workers",
            self.operator_id, self.execution, self.worker_count
        )
    }
}

impl StructuredLog for PipelineStarted<'_> {
    fn log(&self) {
        tracing::info!(
            operator_id = self.operator_id,
            execution = self.execution,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            operator_id = self.operator_id,
            execution = self.execution,
            worker_count = self.worker_count,
        )
    }
}

/// Pipeline execution completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineCompleted<'a> {
    pub operator_id: &'a str,
    pub execution: &'a str,
    pub contributions: usize,
    pub duration: std::time::Duration,
}

impl Display for PipelineCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' completed {} pipeline: {} contributions in {:?}",
            self.operator_id, self.execution, self.contributions, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            operator_id = self.operator_id,
            execution = self.execution,
            contributions = self.contributions,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_completed",
            span_name = name,
            operator_id = self.operator_id,
            duration = ?self.duration,
        )
    }
}

/// Sequential pipeline aborted because a worker failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PipelineAborted<'a> {
    pub operator_id: &'a str,
    pub worker_id: &'a str,
    pub remaining_workers: usize,
}

impl Display for PipelineAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' aborted its chain at worker '{}': {} downstream workers skipped",
            self.operator_id, self.worker_id, self.remaining_workers
        )
    }
}

impl StructuredLog for PipelineAborted<'_> {
    fn log(&self) {
        tracing::error!(
            operator_id = self.operator_id,
            worker_id = self.worker_id,
            remaining_workers = self.remaining_workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pipeline_aborted",
            span_name = name,
            operator_id = self.operator_id,
            worker_id = self.worker_id,
        )
    }
}

/// A parallel worker's contribution was omitted from the aggregate.
///
/// # Log Level
/// `warn!` - Degraded result, siblings unaffected
pub struct ContributionOmitted<'a> {
    pub operator_id: &'a str,
    pub worker_id: &'a str,
    pub reason: &'a str,
}

impl Display for ContributionOmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' omitted contribution of worker '{}': {}",
            self.operator_id, self.worker_id, self.reason
        )
    }
}

impl StructuredLog for ContributionOmitted<'_> {
    fn log(&self) {
        tracing::warn!(
            operator_id = self.operator_id,
            worker_id = self.worker_id,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "contribution_omitted",
            span_name = name,
            operator_id = self.operator_id,
            worker_id = self.worker_id,
        )
    }
}

/// `run_pipeline` called on an event-driven operator.
///
/// # Log Level
/// `debug!` - Expected no-op
pub struct EventDrivenRunSkipped<'a> {
    pub operator_id: &'a str,
}

impl Display for EventDrivenRunSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' is EVENT_DRIVEN; orchestration is delegated to event adapters",
            self.operator_id
        )
    }
}

impl StructuredLog for EventDrivenRunSkipped<'_> {
    fn log(&self) {
        tracing::debug!(operator_id = self.operator_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("event_driven_run", span_name = name, operator_id = self.operator_id)
    }
}

/// System assembled and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foreman::observability::messages::engine::SystemBooted;
///
/// let msg = SystemBooted {
///     unit_id: "btc_usd",
///     operator_count: 3,
///     autonomous_count: 2,
///     adapter_count: 4,
///     schedule_count: 1,
///     warning_count: 0,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SystemBooted<'a> {
    pub unit_id: &'a str,
    pub operator_count: usize,
    pub autonomous_count: usize,
    pub adapter_count: usize,
    pub schedule_count: usize,
    pub warning_count: usize,
}

impl Display for SystemBooted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unit '{}' booted: {} operators, {} autonomous workers, {} adapters, {} schedules, {} warnings",
            self.unit_id,
            self.operator_count,
            self.autonomous_count,
            self.adapter_count,
            self.schedule_count,
            self.warning_count
        )
    }
}

impl StructuredLog for SystemBooted<'_> {
    fn log(&self) {
        tracing::info!(
            unit_id = self.unit_id,
            operator_count = self.operator_count,
            autonomous_count = self.autonomous_count,
            adapter_count = self.adapter_count,
            schedule_count = self.schedule_count,
            warning_count = self.warning_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("system", span_name = name, unit_id = self.unit_id)
    }
}

/// Running system changed lifecycle state.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SystemLifecycle<'a> {
    pub unit_id: &'a str,
    pub transition: &'a str,
}

impl Display for SystemLifecycle<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unit '{}' {}", self.unit_id, self.transition)
    }
}

impl StructuredLog for SystemLifecycle<'_> {
    fn log(&self) {
        tracing::info!(unit_id = self.unit_id, transition = self.transition, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "system_lifecycle",
            span_name = name,
            unit_id = self.unit_id,
            transition = self.transition,
        )
    }
}
