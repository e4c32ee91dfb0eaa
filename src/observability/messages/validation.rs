// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for event chain validation.
//!
//! This module contains message types for logging events related to:
//! * Validation start and completion
//! * Individual event chain defects (errors)
//! * Suspicious-but-legal configurations (warnings)

use crate::errors::{EventChainError, EventChainWarning};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Event chain validation started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_foreman::observability::messages::validation::ValidationStarted;
///
/// let msg = ValidationStarted {
///     event_count: 5,
///     rule_count: 3,
///     worker_count: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ValidationStarted {
    pub event_count: usize,
    pub rule_count: usize,
    pub worker_count: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validating event chain: {} events, {} wiring rules, {} workers",
            self.event_count, self.rule_count, self.worker_count
        )
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::info!(
            event_count = self.event_count,
            rule_count = self.rule_count,
            worker_count = self.worker_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "validation",
            span_name = name,
            event_count = self.event_count,
            rule_count = self.rule_count,
        )
    }
}

/// Event chain validation finished.
///
/// # Log Level
/// `info!` when clean, `warn!` when warnings only, `error!` when errors were found
pub struct ValidationCompleted {
    pub error_count: usize,
    pub warning_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Event chain validation completed: {} errors, {} warnings in {:?}",
            self.error_count, self.warning_count, self.duration
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        if self.error_count > 0 {
            tracing::error!(
                error_count = self.error_count,
                warning_count = self.warning_count,
                "{}", self
            );
        } else if self.warning_count > 0 {
            tracing::warn!(
                error_count = self.error_count,
                warning_count = self.warning_count,
                "{}", self
            );
        } else {
            tracing::info!(
                error_count = self.error_count,
                warning_count = self.warning_count,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "validation_completed",
            span_name = name,
            error_count = self.error_count,
            warning_count = self.warning_count,
        )
    }
}

/// A single structural defect.
///
/// # Log Level
/// `error!` - Boot will abort
pub struct EventChainDefect<'a> {
    pub error: &'a EventChainError,
}

impl Display for EventChainDefect<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for EventChainDefect<'_> {
    fn log(&self) {
        let kind = match self.error {
            EventChainError::MissingPublisher { .. } => "missing_publisher",
            EventChainError::CircularDependency { .. } => "circular_dependency",
            EventChainError::ConflictingPayloadTypes { .. } => "conflicting_payload_types",
            EventChainError::UndefinedEvent { .. } => "undefined_event",
        };
        tracing::error!(defect = kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("event_chain_defect", span_name = name)
    }
}

/// Suspicious but legal event chain configuration.
///
/// # Log Level
/// `warn!` - Boot proceeds, operator should confirm intent
///
/// # Example
/// ```
/// use the_foreman::errors::EventChainWarning;
/// use the_foreman::observability::messages::validation::EventChainWarningRaised;
///
/// let warning = EventChainWarning::DeadEnd {
///     event: "telemetry".to_string(),
///     publishers: vec!["sensor".to_string()],
/// };
/// let msg = EventChainWarningRaised { warning: &warning };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct EventChainWarningRaised<'a> {
    pub warning: &'a EventChainWarning,
}

impl Display for EventChainWarningRaised<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.warning)
    }
}

impl StructuredLog for EventChainWarningRaised<'_> {
    fn log(&self) {
        match self.warning {
            EventChainWarning::DeadEnd { event, publishers } => {
                tracing::warn!(
                    event = event.as_str(),
                    publisher_count = publishers.len(),
                    "{}", self
                );
            }
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("event_chain_warning", span_name = name)
    }
}
