// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SystemConfig;

/// Publisher label used for events injected by an external driver
pub const EXTERNAL_PUBLISHER: &str = "external";

/// Derived view of the declared event chain.
///
/// Built fresh from a [`SystemConfig`] on every boot and discarded after
/// validation. All maps are ordered so that every traversal, and every
/// report built from one, is deterministic.
///
/// Publishers are worker `publishes` declarations, wiring rule result
/// events, schedules and `external` event definitions. Subscribers are
/// worker `subscribes` declarations and wiring rule `listens_to` events.
/// A downstream edge A → B exists whenever a wiring rule listens to A and
/// republishes its result as B.
#[derive(Debug, Clone, Default)]
pub struct EventGraph {
    defined: BTreeSet<String>,
    publishers: BTreeMap<String, BTreeSet<String>>,
    subscribers: BTreeMap<String, BTreeSet<String>>,
    downstream: BTreeMap<String, BTreeSet<String>>,
    payload_types: BTreeMap<String, BTreeSet<(String, String)>>,
    references: BTreeMap<String, BTreeSet<String>>,
}

impl EventGraph {
    pub fn from_config(config: &SystemConfig) -> Self {
        let mut graph = Self::default();

        for definition in &config.events {
            graph.defined.insert(definition.name.clone());
            if definition.is_external() {
                graph.add_publisher(&definition.name, EXTERNAL_PUBLISHER);
            }
        }

        for worker in config.operators.iter().flat_map(|op| op.workers.iter()) {
            for publication in &worker.publishes {
                graph.add_publisher(&publication.event, &worker.id);
                graph.add_reference(&publication.event, &worker.id);
                if let Some(payload_type) = &publication.payload_type {
                    graph
                        .payload_types
                        .entry(publication.event.clone())
                        .or_default()
                        .insert((worker.id.clone(), payload_type.clone()));
                }
            }
            for event in &worker.subscribes {
                graph.add_subscriber(event, &worker.id);
                graph.add_reference(event, &worker.id);
            }
        }

        for rule in &config.wiring {
            graph.add_subscriber(&rule.listens_to, &rule.adapter_id);
            graph.add_reference(&rule.listens_to, &rule.adapter_id);
            if let Some(result_event) = &rule.publishes {
                graph.add_publisher(result_event, &rule.adapter_id);
                graph.add_reference(result_event, &rule.adapter_id);
                graph
                    .downstream
                    .entry(rule.listens_to.clone())
                    .or_default()
                    .insert(result_event.clone());
            }
        }

        for schedule in &config.schedules {
            let label = format!("schedule:{}", schedule.name);
            graph.add_publisher(&schedule.event, &label);
            graph.add_reference(&schedule.event, &label);
        }

        graph
    }

    fn add_publisher(&mut self, event: &str, publisher: &str) {
        self.publishers
            .entry(event.to_string())
            .or_default()
            .insert(publisher.to_string());
    }

    fn add_subscriber(&mut self, event: &str, subscriber: &str) {
        self.subscribers
            .entry(event.to_string())
            .or_default()
            .insert(subscriber.to_string());
    }

    fn add_reference(&mut self, event: &str, referrer: &str) {
        self.references
            .entry(event.to_string())
            .or_default()
            .insert(referrer.to_string());
    }

    pub fn is_defined(&self, event: &str) -> bool {
        self.defined.contains(event)
    }

    pub fn publishers_of(&self, event: &str) -> Option<&BTreeSet<String>> {
        self.publishers.get(event)
    }

    pub fn subscribers_of(&self, event: &str) -> Option<&BTreeSet<String>> {
        self.subscribers.get(event)
    }

    /// Events directly republished by wiring rules listening to `event`
    pub fn downstream_of(&self, event: &str) -> impl Iterator<Item = &str> {
        self.downstream
            .get(event)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Every event that has at least one outgoing downstream edge
    pub fn edge_sources(&self) -> impl Iterator<Item = &str> {
        self.downstream.keys().map(String::as_str)
    }

    pub fn published_events(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.publishers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn subscribed_events(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.subscribers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Declared (publisher, payload type) pairs per event
    pub fn payload_declarations(&self) -> impl Iterator<Item = (&str, &BTreeSet<(String, String)>)> {
        self.payload_types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Components referencing each event name anywhere in the configuration
    pub fn references(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.references.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AggregationStrategy, EventDefinition, EventPublication, ExecutionStrategy, OperatorConfig,
        RuntimeOptions, ScheduleConfig, ScheduleTrigger, WiringRule, WorkerDescriptor,
    };
    use crate::traits::WorkerKind;

    fn config() -> SystemConfig {
        SystemConfig {
            unit_id: "unit".into(),
            data_dir: "/tmp".into(),
            runtime: RuntimeOptions::default(),
            events: vec![
                EventDefinition {
                    name: "tick".into(),
                    payload_type: "Tick".into(),
                    category: "external".into(),
                },
                EventDefinition {
                    name: "signal".into(),
                    payload_type: "Signal".into(),
                    category: "internal".into(),
                },
            ],
            operators: vec![OperatorConfig {
                id: "ops".into(),
                manages: "recorders".into(),
                execution: ExecutionStrategy::EventDriven,
                aggregation: AggregationStrategy::None,
                workers: vec![WorkerDescriptor {
                    id: "recorder".into(),
                    implementation: "history_recorder".into(),
                    role: WorkerKind::EventDriven,
                    capabilities: Default::default(),
                    requires: vec![],
                    produces: vec![],
                    publishes: vec![EventPublication {
                        event: "recorded".into(),
                        payload_type: Some("Entry".into()),
                    }],
                    subscribes: vec!["signal".into()],
                    params: serde_json::Value::Null,
                }],
            }],
            wiring: vec![WiringRule {
                adapter_id: "detect".into(),
                listens_to: "tick".into(),
                target: "detectors".into(),
                method: "run_pipeline".into(),
                publishes: Some("signal".into()),
            }],
            schedules: vec![ScheduleConfig {
                name: "heartbeat".into(),
                event: "tick".into(),
                trigger: ScheduleTrigger::Interval { every_ms: 10 },
            }],
        }
    }

    #[test]
    fn collects_publishers_and_subscribers() {
        let graph = EventGraph::from_config(&config());

        let tick_publishers: Vec<_> = graph.publishers_of("tick").unwrap().iter().cloned().collect();
        assert_eq!(tick_publishers, vec!["external", "schedule:heartbeat"]);

        assert!(graph.publishers_of("signal").unwrap().contains("detect"));
        assert!(graph.subscribers_of("signal").unwrap().contains("recorder"));
        assert!(graph.subscribers_of("tick").unwrap().contains("detect"));
        assert!(graph.subscribers_of("recorded").is_none());
    }

    #[test]
    fn wiring_rules_create_downstream_edges() {
        let graph = EventGraph::from_config(&config());

        let downstream: Vec<_> = graph.downstream_of("tick").collect();
        assert_eq!(downstream, vec!["signal"]);
        assert_eq!(graph.downstream_of("signal").count(), 0);
        assert_eq!(graph.edge_sources().collect::<Vec<_>>(), vec!["tick"]);
    }

    #[test]
    fn tracks_definitions_and_references() {
        let graph = EventGraph::from_config(&config());

        assert!(graph.is_defined("tick"));
        assert!(!graph.is_defined("recorded"));
        let referenced: Vec<_> = graph.references().map(|(event, _)| event).collect();
        assert_eq!(referenced, vec!["recorded", "signal", "tick"]);
    }
}
