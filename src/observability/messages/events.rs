// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the event bus, event adapters and the scheduler.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Event published with nobody listening.
///
/// # Log Level
/// `trace!` - Legal, usually uninteresting
pub struct NoSubscribers<'a> {
    pub event: &'a str,
}

impl Display for NoSubscribers<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Event '{}' published with no subscribers", self.event)
    }
}

impl StructuredLog for NoSubscribers<'_> {
    fn log(&self) {
        tracing::trace!(event = self.event, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("publish", span_name = name, event = self.event)
    }
}

/// Handler registered for an event name.
///
/// # Log Level
/// `debug!` - Wiring detail
pub struct SubscriptionRegistered<'a> {
    pub event: &'a str,
    pub handler: &'a str,
    pub subscription_id: u64,
}

impl Display for SubscriptionRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler '{}' subscribed to '{}' (subscription {})",
            self.handler, self.event, self.subscription_id
        )
    }
}

impl StructuredLog for SubscriptionRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            event = self.event,
            handler = self.handler,
            subscription_id = self.subscription_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("subscribe", span_name = name, event = self.event, handler = self.handler)
    }
}

/// A subscriber returned an error while handling an event.
///
/// # Log Level
/// `error!` - Failure isolated to one handler
///
/// # Example
/// ```
/// use the_foreman::observability::messages::events::HandlerFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
/// let msg = HandlerFailed {
///     event: "market_data",
///     handler: "signal_adapter",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct HandlerFailed<'a> {
    pub event: &'a str,
    pub handler: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler '{}' failed on event '{}': {}",
            self.handler, self.event, self.error
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            event = self.event,
            handler = self.handler,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("handler_failed", span_name = name, event = self.event, handler = self.handler)
    }
}

/// A subscriber panicked while handling an event.
///
/// # Log Level
/// `error!` - Failure isolated to one handler
pub struct HandlerPanicked<'a> {
    pub event: &'a str,
    pub handler: &'a str,
    pub message: &'a str,
}

impl Display for HandlerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler '{}' panicked on event '{}': {}",
            self.handler, self.event, self.message
        )
    }
}

impl StructuredLog for HandlerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            event = self.event,
            handler = self.handler,
            panic = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("handler_panicked", span_name = name, event = self.event, handler = self.handler)
    }
}

/// Adapter target invocation failed; no result event is published.
///
/// # Log Level
/// `error!` - Failure isolated to one adapter
pub struct AdapterInvocationFailed<'a> {
    pub adapter_id: &'a str,
    pub event: &'a str,
    pub target: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for AdapterInvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Adapter '{}' failed invoking '{}' for event '{}': {}",
            self.adapter_id, self.target, self.event, self.error
        )
    }
}

impl StructuredLog for AdapterInvocationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            adapter_id = self.adapter_id,
            event = self.event,
            target = self.target,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "adapter_failed",
            span_name = name,
            adapter_id = self.adapter_id,
            target = self.target,
        )
    }
}

/// Adapter republished its target's result.
///
/// # Log Level
/// `debug!` - Per-event detail
pub struct AdapterResultPublished<'a> {
    pub adapter_id: &'a str,
    pub trigger: &'a str,
    pub result_event: &'a str,
}

impl Display for AdapterResultPublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Adapter '{}' handled '{}' and published '{}'",
            self.adapter_id, self.trigger, self.result_event
        )
    }
}

impl StructuredLog for AdapterResultPublished<'_> {
    fn log(&self) {
        tracing::debug!(
            adapter_id = self.adapter_id,
            trigger = self.trigger,
            result_event = self.result_event,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("adapter", span_name = name, adapter_id = self.adapter_id)
    }
}

/// A declared subscription with no covering wiring rule was given its own
/// adapter.
///
/// # Log Level
/// `info!` - Boot-time wiring decision
pub struct SubscriptionWired<'a> {
    pub adapter_id: &'a str,
    pub subscriber: &'a str,
    pub event: &'a str,
    pub target: &'a str,
    pub method: &'a str,
}

impl Display for SubscriptionWired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Subscription of '{}' to '{}' wired as adapter '{}' ({}.{})",
            self.subscriber, self.event, self.adapter_id, self.target, self.method
        )
    }
}

impl StructuredLog for SubscriptionWired<'_> {
    fn log(&self) {
        tracing::info!(
            adapter_id = self.adapter_id,
            subscriber = self.subscriber,
            event = self.event,
            target = self.target,
            method = self.method,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("wiring", span_name = name, adapter_id = self.adapter_id)
    }
}

/// A schedule fired.
///
/// # Log Level
/// `debug!` - Periodic detail
pub struct ScheduleTriggered<'a> {
    pub schedule: &'a str,
    pub event: &'a str,
    pub causal_id: &'a str,
}

impl Display for ScheduleTriggered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Schedule '{}' triggered '{}' ({})",
            self.schedule, self.event, self.causal_id
        )
    }
}

impl StructuredLog for ScheduleTriggered<'_> {
    fn log(&self) {
        tracing::debug!(
            schedule = self.schedule,
            event = self.event,
            causal_id = self.causal_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("schedule", span_name = name, schedule = self.schedule)
    }
}

/// Scheduler started or stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SchedulerLifecycle<'a> {
    pub transition: &'a str,
    pub schedule_count: usize,
}

impl Display for SchedulerLifecycle<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scheduler {} with {} schedules", self.transition, self.schedule_count)
    }
}

impl StructuredLog for SchedulerLifecycle<'_> {
    fn log(&self) {
        tracing::info!(
            transition = self.transition,
            schedule_count = self.schedule_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scheduler", span_name = name, transition = self.transition)
    }
}
