// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod event_graph;
mod events;
mod loader;
mod operator;
mod runtime;
mod validation;
mod worker;

pub mod consts;

pub use event_graph::EventGraph;
pub use events::{EventDefinition, ScheduleConfig, ScheduleTrigger, WiringRule};
pub use loader::{load_config, RuntimeOptions, SystemConfig};
pub use operator::{AggregationStrategy, ExecutionStrategy, OperatorConfig};
pub use validation::{validate_event_chain, ValidationReport};
pub use worker::{CapabilityFlags, EventPublication, WorkerDescriptor};
