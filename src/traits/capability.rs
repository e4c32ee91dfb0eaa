// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Narrow capability interfaces.
//!
//! A worker implementation opts into a capability by implementing the matching
//! trait and returning `Some(self)` from the corresponding `Worker::as_*_mut`
//! hook. Handles are attached by composition after construction, never
//! inherited.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workers::{EventEmitter, HistoryWriter, StateHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    State,
    Events,
    History,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::State => write!(f, "state"),
            Capability::Events => write!(f, "events"),
            Capability::History => write!(f, "history"),
        }
    }
}

/// Worker that keeps operational state in an atomic single-object store.
pub trait StatefulWorker {
    fn attach_state(&mut self, state: StateHandle);
}

/// Worker that emits events onto the bus.
pub trait EventEmittingWorker {
    fn attach_emitter(&mut self, emitter: EventEmitter);
}

/// Worker that appends causal entries to the history journal.
pub trait HistoryWritingWorker {
    fn attach_history(&mut self, history: HistoryWriter);
}
