// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its documented level with structured fields.
//!
//! # Organization
//!
//! * `engine` - Operator lifecycle, pipeline runs and system boot
//! * `worker` - Worker construction and execution
//! * `validation` - Event chain validation errors and warnings
//! * `events` - Event bus, adapters and scheduler
//! * `persistence` - Atomic store recovery and journal writes

use tracing::Span;

pub mod engine;
pub mod events;
pub mod persistence;
pub mod validation;
pub mod worker;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its documented level
    fn log(&self);

    /// Build a span carrying the message's fields
    fn span(&self, name: &str) -> Span;
}
