// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event adapters and their dispatch loop.
//!
//! An [`EventAdapter`] binds one wiring rule to its resolved target. The bus
//! handler registered for a rule never runs the target itself: it only queues
//! the event. [`EventWiring`] drains that queue once started and runs each
//! invocation as its own task, at most `concurrency` at a time, so a slow or
//! failing autonomous worker never blocks the publisher or its siblings.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::consts::RUN_PIPELINE_METHOD;
use crate::config::{ExecutionStrategy, WiringRule};
use crate::engine::Operator;
use crate::errors::{AdapterError, ConfigurationError, HandlerError};
use crate::events::bus::panic_message;
use crate::events::{causal_scope, Event, EventBus, EventHandler, SubscriptionId};
use crate::observability::messages::events::{AdapterInvocationFailed, AdapterResultPublished};
use crate::observability::messages::StructuredLog;
use crate::workers::AutonomousWorker;

/// What a wiring rule invokes.
#[derive(Clone)]
pub enum AdapterTarget {
    Operator(Arc<Operator>),
    Worker(AutonomousWorker),
}

impl AdapterTarget {
    pub fn name(&self) -> &str {
        match self {
            AdapterTarget::Operator(operator) => operator.id(),
            AdapterTarget::Worker(worker) => &worker.id,
        }
    }

    fn supports(&self, method: &str) -> bool {
        match self {
            AdapterTarget::Operator(_) => method == RUN_PIPELINE_METHOD,
            AdapterTarget::Worker(worker) => worker.worker.methods().contains(&method),
        }
    }
}

impl fmt::Debug for AdapterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterTarget::Operator(operator) => f.debug_tuple("Operator").field(&operator.id()).finish(),
            AdapterTarget::Worker(worker) => f.debug_tuple("Worker").field(&worker.id).finish(),
        }
    }
}

/// One wiring rule bound to its target.
#[derive(Debug)]
pub struct EventAdapter {
    rule: WiringRule,
    target: AdapterTarget,
}

impl EventAdapter {
    pub fn new(rule: WiringRule, target: AdapterTarget) -> Result<Self, ConfigurationError> {
        if let AdapterTarget::Operator(operator) = &target {
            if operator.execution() == ExecutionStrategy::EventDriven {
                return Err(ConfigurationError::EventDrivenOperatorTarget {
                    adapter_id: rule.adapter_id.clone(),
                    operator_id: operator.id().to_string(),
                });
            }
        }
        if !target.supports(&rule.method) {
            return Err(ConfigurationError::UnknownMethod {
                adapter_id: rule.adapter_id.clone(),
                target: rule.target.clone(),
                method: rule.method.clone(),
            });
        }
        Ok(Self { rule, target })
    }

    pub fn id(&self) -> &str {
        &self.rule.adapter_id
    }

    pub fn listens_to(&self) -> &str {
        &self.rule.listens_to
    }

    pub fn result_event(&self) -> Option<&str> {
        self.rule.publishes.as_deref()
    }

    pub fn target(&self) -> &AdapterTarget {
        &self.target
    }

    /// Run the target for `event` without publishing anything.
    ///
    /// An operator receives the event payload as pipeline input; an
    /// autonomous worker receives the whole event. Either runs with the
    /// event's causal ids in scope.
    pub async fn invoke(&self, event: &Event) -> Result<Option<Value>, AdapterError> {
        causal_scope(event.causal_ids.clone(), self.invoke_target(event)).await
    }

    async fn invoke_target(&self, event: &Event) -> Result<Option<Value>, AdapterError> {
        match &self.target {
            AdapterTarget::Operator(operator) => {
                Ok(Some(operator.run_pipeline(event.payload.clone()).await?))
            }
            AdapterTarget::Worker(worker) => worker
                .worker
                .invoke(&self.rule.method, event)
                .await
                .map_err(|source| AdapterError::Worker {
                    worker_id: worker.id.clone(),
                    method: self.rule.method.clone(),
                    source,
                }),
        }
    }

    /// Invoke the target and publish the result event, if the rule declares
    /// one and the target returned a value.
    pub async fn dispatch(&self, event: &Event, bus: &EventBus) -> Result<(), AdapterError> {
        let outcome = self.invoke(event).await;
        self.complete(event, outcome, bus)
    }

    fn complete(
        &self,
        trigger: &Event,
        outcome: Result<Option<Value>, AdapterError>,
        bus: &EventBus,
    ) -> Result<(), AdapterError> {
        match outcome {
            Ok(Some(payload)) => {
                if let Some(result_event) = self.result_event() {
                    bus.publish(&Event::derived(result_event, payload, trigger));
                    AdapterResultPublished {
                        adapter_id: self.id(),
                        trigger: &trigger.name,
                        result_event,
                    }
                    .log();
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(error) => {
                AdapterInvocationFailed {
                    adapter_id: self.id(),
                    event: &trigger.name,
                    target: self.target.name(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }
}

type Queued = (usize, Event);

struct QueueHandler {
    label: String,
    index: usize,
    queue: UnboundedSender<Queued>,
}

impl EventHandler for QueueHandler {
    fn label(&self) -> &str {
        &self.label
    }

    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        self.queue
            .send((self.index, event.clone()))
            .map_err(|_| HandlerError::ChannelClosed(self.label.clone()))
    }
}

/// The set of adapters of one running system and their dispatch loop.
///
/// Subscriptions are registered on construction, so events published before
/// [`start`](Self::start) are queued and dispatched once the loop runs.
pub struct EventWiring {
    bus: EventBus,
    adapters: Arc<Vec<Arc<EventAdapter>>>,
    subscriptions: Vec<SubscriptionId>,
    queue: Option<UnboundedReceiver<Queued>>,
    concurrency: usize,
    token: CancellationToken,
    dispatcher: Option<JoinHandle<()>>,
}

impl EventWiring {
    pub fn new(bus: EventBus, adapters: Vec<EventAdapter>, concurrency: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let adapters: Vec<Arc<EventAdapter>> = adapters.into_iter().map(Arc::new).collect();

        let subscriptions = adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| {
                bus.subscribe(
                    adapter.listens_to(),
                    Arc::new(QueueHandler {
                        label: format!("adapter:{}", adapter.id()),
                        index,
                        queue: tx.clone(),
                    }),
                )
            })
            .collect();

        Self {
            bus,
            adapters: Arc::new(adapters),
            subscriptions,
            queue: Some(rx),
            concurrency: concurrency.max(1),
            token: CancellationToken::new(),
            dispatcher: None,
        }
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &EventAdapter> {
        self.adapters.iter().map(|adapter| adapter.as_ref())
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// True once [`stop`](Self::stop) ran. Stopped wiring cannot be restarted.
    pub fn is_stopped(&self) -> bool {
        self.queue.is_none() && self.dispatcher.is_none()
    }

    /// Spawn the dispatch loop. Must be called inside a tokio runtime; a
    /// second call, or a call after `stop`, is a no-op.
    pub fn start(&mut self) {
        let Some(queue) = self.queue.take() else {
            return;
        };
        self.dispatcher = Some(tokio::spawn(dispatch_loop(
            queue,
            self.adapters.clone(),
            self.bus.clone(),
            self.concurrency,
            self.token.clone(),
        )));
    }

    /// Unsubscribe every adapter, stop the loop and wait for in-flight
    /// invocations. Queued events not yet dispatched are dropped.
    pub async fn stop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
        self.queue = None;
        self.token.cancel();
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = dispatcher.await;
        }
    }
}

impl Drop for EventWiring {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
        self.token.cancel();
    }
}

async fn dispatch_loop(
    mut queue: UnboundedReceiver<Queued>,
    adapters: Arc<Vec<Arc<EventAdapter>>>,
    bus: EventBus,
    concurrency: usize,
    token: CancellationToken,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            received = queue.recv() => {
                let Some((index, event)) = received else {
                    break;
                };
                let Some(adapter) = adapters.get(index).cloned() else {
                    continue;
                };
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let bus = bus.clone();
                in_flight.spawn(async move {
                    let _permit = permit;
                    run_isolated(adapter, event, bus).await;
                });
            }
        }
    }

    while in_flight.join_next().await.is_some() {}
}

/// Run one invocation in its own task so a panicking target is reported
/// like any other failure.
async fn run_isolated(adapter: Arc<EventAdapter>, event: Event, bus: EventBus) {
    let invocation = {
        let adapter = adapter.clone();
        let event = event.clone();
        tokio::spawn(async move { adapter.invoke(&event).await })
    };

    let outcome = match invocation.await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(AdapterError::Panicked(join_message(join_error))),
    };
    // failures are logged by complete()
    let _ = adapter.complete(&event, outcome, &bus);
}

fn join_message(error: JoinError) -> String {
    if error.is_panic() {
        panic_message(error.into_panic().as_ref()).to_string()
    } else {
        error.to_string()
    }
}
