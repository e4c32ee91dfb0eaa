// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Events and their routing: the event model, the bus, wiring adapters and
//! the scheduler.

pub mod adapter;
pub mod bus;
mod context;
pub mod event;
pub mod scheduler;

pub use adapter::{AdapterTarget, EventAdapter, EventWiring};
pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use context::{causal_scope, current_causal_ids};
pub use event::{CausalId, CausalKind, Event};
pub use scheduler::Scheduler;
