// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bootstrap;     // boot sequence + running system
pub mod config;        // configuration objects + event chain validation
pub mod engine;        // operators
pub mod errors;        // error handling
pub mod events;        // bus, adapters, scheduler
pub mod observability;
pub mod persistence;   // atomic store, journal, bulk store
pub mod traits;        // worker + persistence contracts
pub mod workers;       // registry, workforce builder, builtins

pub use bootstrap::{bootstrap, RunningSystem};
