// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker construction pipeline.
//!
//! Turns the worker descriptors of one operator into a [`Workforce`]: each
//! descriptor is resolved through the [`WorkerRegistry`], checked for
//! role/capability consistency, instantiated, given its capability handles and
//! classified as pipeline-participating or autonomous. The builder never
//! decides when a worker runs.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::{OperatorConfig, WorkerDescriptor};
use crate::errors::ConfigurationError;
use crate::events::EventBus;
use crate::observability::messages::worker::{
    CapabilityAttached, WorkerConstructed, WorkerConstructionFailed,
};
use crate::observability::messages::StructuredLog;
use crate::persistence::PersistorFactory;
use crate::traits::{Capability, EventDrivenWorker, StandardWorker, WorkerImpl, WorkerKind};
use crate::workers::{BuildContext, EventEmitter, HistoryWriter, StateHandle, WorkerRegistry};

/// A STANDARD worker, owned by its operator.
#[derive(Clone)]
pub struct PipelineWorker {
    pub id: String,
    pub worker: Arc<dyn StandardWorker>,
}

/// An EVENT_DRIVEN worker, owned by the adapters wired to it.
#[derive(Clone)]
pub struct AutonomousWorker {
    pub id: String,
    pub operator_id: String,
    pub worker: Arc<dyn EventDrivenWorker>,
}

impl fmt::Debug for PipelineWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineWorker")
            .field("id", &self.id)
            .field("implementation", &self.worker.name())
            .finish()
    }
}

impl fmt::Debug for AutonomousWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutonomousWorker")
            .field("id", &self.id)
            .field("operator_id", &self.operator_id)
            .field("implementation", &self.worker.name())
            .finish()
    }
}

/// The two disjoint, declaration-ordered partitions built for one operator.
#[derive(Debug, Default)]
pub struct Workforce {
    pub pipeline: Vec<PipelineWorker>,
    pub autonomous: Vec<AutonomousWorker>,
}

/// Builds workforces for every operator of one unit.
///
/// Worker ids are unique across the whole unit, so one builder is used for
/// all operators of a boot.
pub struct WorkforceBuilder<'a> {
    unit_id: &'a str,
    registry: &'a WorkerRegistry,
    persistors: &'a PersistorFactory,
    bus: &'a EventBus,
    seen: HashSet<String>,
}

impl<'a> WorkforceBuilder<'a> {
    pub fn new(
        unit_id: &'a str,
        registry: &'a WorkerRegistry,
        persistors: &'a PersistorFactory,
        bus: &'a EventBus,
    ) -> Self {
        Self {
            unit_id,
            registry,
            persistors,
            bus,
            seen: HashSet::new(),
        }
    }

    /// Build the workforce of `operator`. The first inconsistent descriptor
    /// aborts the build.
    pub fn build(&mut self, operator: &OperatorConfig) -> Result<Workforce, ConfigurationError> {
        let mut workforce = Workforce::default();

        for descriptor in &operator.workers {
            let worker = match self.build_worker(&operator.id, descriptor) {
                Ok(worker) => worker,
                Err(e) => {
                    WorkerConstructionFailed {
                        worker_id: &descriptor.id,
                        error: &e,
                    }
                    .log();
                    return Err(e);
                }
            };

            match worker {
                WorkerImpl::Standard(worker) => workforce.pipeline.push(PipelineWorker {
                    id: descriptor.id.clone(),
                    worker: Arc::from(worker),
                }),
                WorkerImpl::EventDriven(worker) => workforce.autonomous.push(AutonomousWorker {
                    id: descriptor.id.clone(),
                    operator_id: operator.id.clone(),
                    worker: Arc::from(worker),
                }),
            }
        }

        Ok(workforce)
    }

    fn build_worker(
        &mut self,
        operator_id: &str,
        descriptor: &WorkerDescriptor,
    ) -> Result<WorkerImpl, ConfigurationError> {
        if !self.seen.insert(descriptor.id.clone()) {
            return Err(ConfigurationError::DuplicateWorkerId {
                worker_id: descriptor.id.clone(),
            });
        }

        let actual = self.registry.kind_of(&descriptor.implementation).ok_or_else(|| {
            ConfigurationError::UnknownImplementation {
                worker_id: descriptor.id.clone(),
                implementation: descriptor.implementation.clone(),
            }
        })?;

        if actual != descriptor.role {
            return Err(ConfigurationError::RoleMismatch {
                worker_id: descriptor.id.clone(),
                implementation: descriptor.implementation.clone(),
                declared: descriptor.role,
                actual,
            });
        }

        if descriptor.role == WorkerKind::EventDriven && !descriptor.capabilities.events {
            return Err(ConfigurationError::MissingEventsCapability {
                worker_id: descriptor.id.clone(),
            });
        }

        let ctx = BuildContext {
            unit_id: self.unit_id,
            operator_id,
            descriptor,
        };
        let mut worker = self
            .registry
            .create(&descriptor.implementation, &ctx)
            .ok_or_else(|| ConfigurationError::UnknownImplementation {
                worker_id: descriptor.id.clone(),
                implementation: descriptor.implementation.clone(),
            })?
            .map_err(|e| ConfigurationError::WorkerCreationFailed {
                worker_id: descriptor.id.clone(),
                implementation: descriptor.implementation.clone(),
                reason: e.to_string(),
            })?;

        let enabled = descriptor.capabilities.enabled();
        for capability in &enabled {
            if !supports(&mut worker, *capability) {
                return Err(ConfigurationError::CapabilityNotSupported {
                    worker_id: descriptor.id.clone(),
                    implementation: descriptor.implementation.clone(),
                    capability: *capability,
                });
            }
        }

        for capability in &enabled {
            self.attach(operator_id, descriptor, &mut worker, *capability)?;
            CapabilityAttached {
                worker_id: &descriptor.id,
                capability: &capability.to_string(),
            }
            .log();
        }

        let capabilities = enabled
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        WorkerConstructed {
            worker_id: &descriptor.id,
            implementation: &descriptor.implementation,
            kind: &worker.kind().to_string(),
            capabilities: &capabilities,
        }
        .log();

        Ok(worker)
    }

    fn attach(
        &self,
        operator_id: &str,
        descriptor: &WorkerDescriptor,
        worker: &mut WorkerImpl,
        capability: Capability,
    ) -> Result<(), ConfigurationError> {
        let persistence_error = |source| ConfigurationError::Persistence {
            worker_id: descriptor.id.clone(),
            capability,
            source,
        };

        match capability {
            Capability::State => {
                let store = self
                    .persistors
                    .state_store(operator_id, &descriptor.id)
                    .map_err(persistence_error)?;
                if let Some(hook) = worker.as_stateful_mut() {
                    hook.attach_state(StateHandle::new(Arc::new(store)));
                }
            }
            Capability::Events => {
                let emitter = EventEmitter::new(
                    self.bus.clone(),
                    descriptor.id.clone(),
                    descriptor.publishes.iter().map(|p| p.event.clone()),
                );
                if let Some(hook) = worker.as_event_emitting_mut() {
                    hook.attach_emitter(emitter);
                }
            }
            Capability::History => {
                let journal = self
                    .persistors
                    .journal(self.unit_id)
                    .map_err(persistence_error)?;
                if let Some(hook) = worker.as_history_writing_mut() {
                    hook.attach_history(HistoryWriter::new(Arc::new(journal)));
                }
            }
        }
        Ok(())
    }
}

fn supports(worker: &mut WorkerImpl, capability: Capability) -> bool {
    match capability {
        Capability::State => worker.as_stateful_mut().is_some(),
        Capability::Events => worker.as_event_emitting_mut().is_some(),
        Capability::History => worker.as_history_writing_mut().is_some(),
    }
}
