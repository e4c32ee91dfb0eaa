// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Foreman. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between the human-readable text and structured fields
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Operator construction and pipeline execution
//! * `messages::worker` - Worker construction and invocation
//! * `messages::validation` - Event chain validation errors and warnings
//! * `messages::events` - Event bus dispatch, adapters and the scheduler
//! * `messages::persistence` - Store recovery and write failures
//!
//! # Usage
//!
//! ```rust
//! use the_foreman::observability::messages::{engine::PipelineStarted, StructuredLog};
//!
//! let msg = PipelineStarted {
//!     operator_id: "signal_detection",
//!     execution: "PARALLEL",
//!     worker_count: 3,
//! };
//!
//! msg.log();
//! ```
//!
//! The library never installs a subscriber; the binary does that with
//! `tracing-subscriber` and an `EnvFilter`.

pub mod messages;
