// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::WorkerDescriptor;
use crate::errors::WorkerError;
use crate::traits::{EventDrivenWorker, StandardWorker, WorkerImpl, WorkerKind};
use crate::workers::builtin;

/// Everything a worker factory may look at while constructing an instance.
pub struct BuildContext<'a> {
    pub unit_id: &'a str,
    pub operator_id: &'a str,
    pub descriptor: &'a WorkerDescriptor,
}

impl BuildContext<'_> {
    pub fn worker_id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn params(&self) -> &Value {
        &self.descriptor.params
    }

    /// A required parameter.
    pub fn param(&self, key: &str) -> Result<&Value, WorkerError> {
        self.descriptor
            .params
            .get(key)
            .ok_or_else(|| WorkerError::InvalidInput(format!("missing parameter '{}'", key)))
    }

    /// Events this worker declares it publishes, in declaration order.
    pub fn published_events(&self) -> Vec<String> {
        self.descriptor
            .publishes
            .iter()
            .map(|p| p.event.clone())
            .collect()
    }
}

type StandardFactory =
    dyn Fn(&BuildContext<'_>) -> Result<Box<dyn StandardWorker>, WorkerError> + Send + Sync;
type EventDrivenFactory =
    dyn Fn(&BuildContext<'_>) -> Result<Box<dyn EventDrivenWorker>, WorkerError> + Send + Sync;

#[derive(Clone)]
enum Factory {
    Standard(Arc<StandardFactory>),
    EventDriven(Arc<EventDrivenFactory>),
}

/// Init-time plugin registry.
///
/// Every worker implementation registers itself under a stable identifier,
/// together with its structural role. The workforce builder resolves
/// descriptors through this registry; nothing is looked up by reflection.
///
/// # Example
/// ```
/// use the_foreman::traits::WorkerKind;
/// use the_foreman::workers::WorkerRegistry;
///
/// let registry = WorkerRegistry::with_builtins();
/// assert_eq!(registry.kind_of("add"), Some(WorkerKind::Standard));
/// assert_eq!(registry.kind_of("history_recorder"), Some(WorkerKind::EventDriven));
/// assert_eq!(registry.kind_of("warp_drive"), None);
/// ```
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    factories: BTreeMap<String, Factory>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the builtin implementations.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    pub fn register_standard<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&BuildContext<'_>) -> Result<Box<dyn StandardWorker>, WorkerError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.into(), Factory::Standard(Arc::new(factory)));
        self
    }

    pub fn register_event_driven<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&BuildContext<'_>) -> Result<Box<dyn EventDrivenWorker>, WorkerError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.into(), Factory::EventDriven(Arc::new(factory)));
        self
    }

    /// Structural role of a registered implementation
    pub fn kind_of(&self, name: &str) -> Option<WorkerKind> {
        self.factories.get(name).map(|factory| match factory {
            Factory::Standard(_) => WorkerKind::Standard,
            Factory::EventDriven(_) => WorkerKind::EventDriven,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered implementation names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiate `name`. `None` when nothing is registered under it.
    pub fn create(&self, name: &str, ctx: &BuildContext<'_>) -> Option<Result<WorkerImpl, WorkerError>> {
        self.factories.get(name).map(|factory| match factory {
            Factory::Standard(f) => f(ctx).map(WorkerImpl::Standard),
            Factory::EventDriven(f) => f(ctx).map(WorkerImpl::EventDriven),
        })
    }
}

impl fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("implementations", &self.list())
            .finish()
    }
}
