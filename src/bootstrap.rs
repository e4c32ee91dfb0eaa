// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boot sequence and the running-system lifecycle.
//!
//! [`bootstrap`] builds and validates everything for one unit and returns a
//! [`RunningSystem`] that is not yet running. Nothing is ambient: the bus,
//! the scheduler, the operators and the adapter wiring all live inside the
//! returned value.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::consts::RUN_PIPELINE_METHOD;
use crate::config::{validate_event_chain, SystemConfig, ValidationReport, WiringRule};
use crate::engine::{Assembly, Operator, OperatorFactory};
use crate::errors::{BootstrapError, ConfigurationError};
use crate::events::{AdapterTarget, CausalId, Event, EventAdapter, EventBus, EventWiring, Scheduler};
use crate::observability::messages::engine::{SystemBooted, SystemLifecycle};
use crate::observability::messages::events::SubscriptionWired;
use crate::observability::messages::validation::{EventChainDefect, EventChainWarningRaised};
use crate::observability::messages::StructuredLog;
use crate::persistence::PersistorFactory;
use crate::workers::WorkerRegistry;

/// Build and validate a complete system from `config`.
///
/// Steps, in order: schedule validation, workforce and operator
/// construction, event chain validation, adapter wiring. The first
/// configuration error aborts; event chain errors abort with the complete
/// batched report. Warnings are logged and kept on the returned system.
///
/// # Example
/// ```no_run
/// use the_foreman::bootstrap::bootstrap;
/// use the_foreman::config::load_config;
/// use the_foreman::workers::WorkerRegistry;
///
/// # async fn run() -> anyhow::Result<()> {
/// let config = load_config("configs/demo.yaml")?;
/// let mut system = bootstrap(&config, &WorkerRegistry::with_builtins())?;
/// system.start();
/// system.inject("market_tick", serde_json::json!(5), vec![])?;
/// system.stop().await;
/// # Ok(())
/// # }
/// ```
pub fn bootstrap(config: &SystemConfig, registry: &WorkerRegistry) -> Result<RunningSystem, BootstrapError> {
    let bus = EventBus::new();
    let scheduler = Scheduler::new(bus.clone(), &config.schedules)?;

    let persistors = PersistorFactory::new(&config.data_dir);
    let assembly = OperatorFactory::from_config(config, registry, &persistors, &bus)?;

    let report = validate_event_chain(config);
    for error in &report.errors {
        EventChainDefect { error }.log();
    }
    let warnings = report.clone().into_result()?;
    for warning in &warnings {
        EventChainWarningRaised { warning }.log();
    }

    let adapters = config
        .wiring
        .iter()
        .cloned()
        .chain(subscription_rules(config, &assembly)?)
        .map(|rule| {
            let target = resolve_target(&rule, &assembly)?;
            EventAdapter::new(rule, target)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let wiring = EventWiring::new(bus.clone(), adapters, config.runtime.adapter_concurrency());

    SystemBooted {
        unit_id: &config.unit_id,
        operator_count: assembly.operators.len(),
        autonomous_count: assembly.autonomous.len(),
        adapter_count: wiring.adapter_count(),
        schedule_count: scheduler.schedule_count(),
        warning_count: warnings.len(),
    }
    .log();

    Ok(RunningSystem {
        unit_id: config.unit_id.clone(),
        bus,
        scheduler,
        wiring,
        operators: assembly.operators,
        defined_events: config.events.iter().map(|e| e.name.clone()).collect(),
        report,
    })
}

/// Wiring rules for declared `subscribes` entries that no configured rule
/// delivers.
///
/// A subscription is covered when a rule listening to the event targets the
/// worker or its operator. An autonomous worker gets its first method; a
/// pipeline worker's operator gets one `run_pipeline` rule per event. Derived
/// rules never republish.
fn subscription_rules(config: &SystemConfig, assembly: &Assembly) -> Result<Vec<WiringRule>, ConfigurationError> {
    let covered = |event: &str, target: &str| {
        config
            .wiring
            .iter()
            .any(|rule| rule.listens_to == event && rule.target == target)
    };

    let mut rules = Vec::new();
    let mut wired: BTreeSet<(String, String)> = BTreeSet::new();

    for operator in &config.operators {
        for worker in &operator.workers {
            for event in &worker.subscribes {
                if covered(event, &worker.id) || covered(event, &operator.id) {
                    continue;
                }

                let (target, method) = match assembly.autonomous.get(&worker.id) {
                    Some(autonomous) => {
                        let method = autonomous.worker.methods().first().copied().ok_or_else(|| {
                            ConfigurationError::UndeliverableSubscription {
                                worker_id: worker.id.clone(),
                                event: event.clone(),
                            }
                        })?;
                        (worker.id.as_str(), method)
                    }
                    None => (operator.id.as_str(), RUN_PIPELINE_METHOD),
                };
                if !wired.insert((target.to_string(), event.clone())) {
                    continue;
                }

                let rule = WiringRule {
                    adapter_id: format!("{}:{}", target, event),
                    listens_to: event.clone(),
                    target: target.to_string(),
                    method: method.to_string(),
                    publishes: None,
                };
                SubscriptionWired {
                    adapter_id: &rule.adapter_id,
                    subscriber: &worker.id,
                    event,
                    target,
                    method,
                }
                .log();
                rules.push(rule);
            }
        }
    }

    Ok(rules)
}

/// Operators are matched first, then autonomous workers.
fn resolve_target(rule: &WiringRule, assembly: &Assembly) -> Result<AdapterTarget, ConfigurationError> {
    if let Some(operator) = assembly.operators.get(&rule.target) {
        return Ok(AdapterTarget::Operator(operator.clone()));
    }
    if let Some(worker) = assembly.autonomous.get(&rule.target) {
        return Ok(AdapterTarget::Worker(worker.clone()));
    }
    Err(ConfigurationError::UnknownWiringTarget {
        adapter_id: rule.adapter_id.clone(),
        target: rule.target.clone(),
    })
}

/// A fully assembled unit. Owns the bus, the scheduler, every operator and
/// the adapter wiring for one run.
pub struct RunningSystem {
    unit_id: String,
    bus: EventBus,
    scheduler: Scheduler,
    wiring: EventWiring,
    operators: HashMap<String, Arc<Operator>>,
    defined_events: BTreeSet<String>,
    report: ValidationReport,
}

impl RunningSystem {
    /// Start adapter dispatch and the scheduler. Must be called inside a
    /// tokio runtime. A stopped system stays stopped: start again by
    /// bootstrapping a new one.
    pub fn start(&mut self) {
        if self.is_running() || self.wiring.is_stopped() {
            return;
        }
        self.wiring.start();
        self.scheduler.start();
        SystemLifecycle {
            unit_id: &self.unit_id,
            transition: "started",
        }
        .log();
    }

    /// Stop the scheduler, release every adapter subscription and wait for
    /// in-flight invocations.
    pub async fn stop(&mut self) {
        self.scheduler.stop().await;
        self.wiring.stop().await;
        SystemLifecycle {
            unit_id: &self.unit_id,
            transition: "stopped",
        }
        .log();
    }

    /// Publish an externally driven event. Returns the number of handlers
    /// that accepted it.
    pub fn inject(
        &self,
        name: &str,
        payload: Value,
        causal_ids: Vec<CausalId>,
    ) -> Result<usize, ConfigurationError> {
        if !self.defined_events.contains(name) {
            return Err(ConfigurationError::UndefinedEvent {
                event: name.to_string(),
            });
        }
        Ok(self
            .bus
            .publish(&Event::new(name, payload).with_causal_ids(causal_ids)))
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn operator(&self, id: &str) -> Option<&Arc<Operator>> {
        self.operators.get(id)
    }

    pub fn validation_report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn is_running(&self) -> bool {
        self.wiring.is_running()
    }
}
