// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reference implementations of the persistence contracts in
//! [`crate::traits::store`].

mod atomic;
mod bulk;
mod factory;
mod journal;
mod models;

pub use atomic::AtomicFileStore;
pub use bulk::InMemoryBulkStore;
pub use factory::PersistorFactory;
pub use journal::JournalFileStore;
pub use models::{BulkRecord, CausalEntry, OperationalState};
