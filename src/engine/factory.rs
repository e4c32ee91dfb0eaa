// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SystemConfig;
use crate::engine::Operator;
use crate::errors::ConfigurationError;
use crate::events::EventBus;
use crate::persistence::PersistorFactory;
use crate::workers::{AutonomousWorker, WorkerRegistry, WorkforceBuilder};

/// Everything the worker construction pipeline and operator factory produce
/// for one unit.
#[derive(Debug, Default)]
pub struct Assembly {
    pub operators: HashMap<String, Arc<Operator>>,
    /// Autonomous workers keyed by worker id
    pub autonomous: HashMap<String, AutonomousWorker>,
}

/// Factory for creating operators from configuration
pub struct OperatorFactory;

impl OperatorFactory {
    /// Build every operator of `config`, in declaration order.
    ///
    /// Each operator's workforce is built first; its pipeline partition is
    /// handed to the operator and its autonomous partition is collected for
    /// the adapters.
    pub fn from_config(
        config: &SystemConfig,
        registry: &WorkerRegistry,
        persistors: &PersistorFactory,
        bus: &EventBus,
    ) -> Result<Assembly, ConfigurationError> {
        let pool_cap = config.runtime.pool_cap();
        let mut builder = WorkforceBuilder::new(&config.unit_id, registry, persistors, bus);
        let mut assembly = Assembly::default();

        for operator_config in &config.operators {
            if assembly.operators.contains_key(&operator_config.id) {
                return Err(ConfigurationError::DuplicateOperatorId {
                    operator_id: operator_config.id.clone(),
                });
            }

            let workforce = builder.build(operator_config)?;
            let operator = Operator::new(operator_config, workforce.pipeline, pool_cap)?;

            assembly
                .operators
                .insert(operator_config.id.clone(), Arc::new(operator));
            for worker in workforce.autonomous {
                assembly.autonomous.insert(worker.id.clone(), worker);
            }
        }

        Ok(assembly)
    }
}
