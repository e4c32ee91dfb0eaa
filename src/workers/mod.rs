// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker construction: the implementation registry, the workforce builder,
//! capability handles and the builtin implementations.

pub mod builtin;
mod builder;
mod capabilities;
mod registry;

#[cfg(test)]
pub(crate) mod stub;

pub use builder::{AutonomousWorker, PipelineWorker, Workforce, WorkforceBuilder};
pub use capabilities::{EventEmitter, HistoryWriter, StateHandle};
pub use registry::{BuildContext, WorkerRegistry};
