// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod configuration;
mod execution;
mod persistence;

pub use config::{EventChainError, EventChainValidationError, EventChainWarning};
pub use configuration::{BootstrapError, ConfigurationError, LoadError};
pub use execution::{AdapterError, HandlerError, WorkerError, WorkerExecutionError};
pub use persistence::PersistenceError;
