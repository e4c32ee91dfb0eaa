// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod capability;
pub mod store;
pub mod worker;

pub use capability::{Capability, EventEmittingWorker, HistoryWritingWorker, StatefulWorker};
pub use store::{BulkStore, LogStore, ObjectStore, ObjectStoreExt};
pub use worker::{EventDrivenWorker, StandardWorker, Worker, WorkerImpl, WorkerKind};
