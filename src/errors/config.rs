// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Structural defects found in the declared event chain.
///
/// Every variant is fatal: boot must not proceed while any of these exist.
#[derive(Debug, Clone, PartialEq)]
pub enum EventChainError {
    /// Something subscribes to an event that nothing publishes
    MissingPublisher {
        event: String,
        /// Workers and adapters that subscribe to the event
        subscribers: Vec<String>,
    },
    /// A wiring loop was detected in the downstream-edge graph
    CircularDependency {
        /// The cycle path, first and last element are the same event
        cycle: Vec<String>,
    },
    /// Publishers disagree on the payload type of an event
    ConflictingPayloadTypes {
        event: String,
        /// (publisher, declared payload type) pairs, sorted by publisher
        declarations: Vec<(String, String)>,
    },
    /// An event name is referenced but absent from the event definitions
    UndefinedEvent {
        event: String,
        referenced_by: String,
    },
}

impl fmt::Display for EventChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventChainError::MissingPublisher { event, subscribers } => {
                write!(
                    f,
                    "Event '{}' has subscribers [{}] but no publisher",
                    event,
                    subscribers.join(", ")
                )
            }
            EventChainError::CircularDependency { cycle } => {
                write!(f, "Circular event dependency detected: {}", cycle.join(" → "))
            }
            EventChainError::ConflictingPayloadTypes {
                event,
                declarations,
            } => {
                write!(f, "Event '{}' is published with conflicting payload types: ", event)?;
                for (i, (publisher, payload_type)) in declarations.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} publishes '{}'", publisher, payload_type)?;
                }
                Ok(())
            }
            EventChainError::UndefinedEvent {
                event,
                referenced_by,
            } => {
                write!(
                    f,
                    "Event '{}' referenced by '{}' is not defined",
                    event, referenced_by
                )
            }
        }
    }
}

/// Suspicious but legal event chain configurations.
#[derive(Debug, Clone, PartialEq)]
pub enum EventChainWarning {
    /// An event is published but nothing listens to it
    DeadEnd {
        event: String,
        publishers: Vec<String>,
    },
}

impl fmt::Display for EventChainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventChainWarning::DeadEnd { event, publishers } => {
                write!(
                    f,
                    "Event '{}' is published by [{}] but has no subscribers (confirm it is a terminal event)",
                    event,
                    publishers.join(", ")
                )
            }
        }
    }
}

/// Batched, fatal report raised once the validator has finished its full pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChainValidationError {
    pub errors: Vec<EventChainError>,
}

impl fmt::Display for EventChainValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event chain validation failed with {} error(s):",
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for EventChainValidationError {}
