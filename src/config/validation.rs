// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Startup validation of the declared event chain.
//!
//! The validator is a pure function over the combined configuration. It
//! builds an [`EventGraph`] and runs independent checks, each producing hard
//! errors (boot must not proceed) or warnings (boot proceeds, the operator is
//! notified):
//!
//! 1. **Vocabulary**: every referenced event name must be defined
//! 2. **Publisher/subscriber consistency**: every subscribed event has a publisher
//! 3. **Circular dependency detection**: no wiring loop in the downstream graph
//! 4. **Dead-end detection** (warning): published events nobody subscribes to
//! 5. **Payload type consistency**: publishers agree on an event's payload type
//!
//! Checks are not fail-fast; the caller receives every defect in one report.
//!
//! # Cycle Detection Algorithm
//! Depth-first search with an explicit recursion stack over the downstream
//! edges. Roots and neighbours are visited in sorted order. Any edge into a
//! node on the current recursion stack is a back-edge and is reported once,
//! with the path from the re-entered node to the current node, closed by the
//! re-entered node. For A → B → C → A the reported cycle is `[A, B, C, A]`.
//!
//! **Time Complexity**: O(V + E)
//!
//! # Example
//! ```rust
//! use the_foreman::config::{validate_event_chain, EventDefinition, SystemConfig, WiringRule};
//!
//! let mut config: SystemConfig = serde_yaml::from_str("unit_id: u\ndata_dir: /tmp\n").unwrap();
//! for name in ["A", "B"] {
//!     config.events.push(EventDefinition {
//!         name: name.into(),
//!         payload_type: "Value".into(),
//!         category: "internal".into(),
//!     });
//! }
//! config.wiring.push(WiringRule {
//!     adapter_id: "a_to_b".into(),
//!     listens_to: "A".into(),
//!     target: "ops".into(),
//!     method: "run_pipeline".into(),
//!     publishes: Some("B".into()),
//! });
//!
//! let report = validate_event_chain(&config);
//! assert_eq!(report.errors.len(), 1);   // nothing publishes A
//! assert_eq!(report.warnings.len(), 1); // nothing listens to B
//! ```

use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use crate::config::{EventGraph, SystemConfig};
use crate::errors::{EventChainError, EventChainValidationError, EventChainWarning};
use crate::observability::messages::validation::{ValidationCompleted, ValidationStarted};
use crate::observability::messages::StructuredLog;

/// Outcome of a full validator pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<EventChainError>,
    pub warnings: Vec<EventChainWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Split into the batched fatal error, or the warnings to log.
    pub fn into_result(self) -> Result<Vec<EventChainWarning>, EventChainValidationError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(EventChainValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Validate the declared event chain of `config`.
pub fn validate_event_chain(config: &SystemConfig) -> ValidationReport {
    let started = Instant::now();
    ValidationStarted {
        event_count: config.events.len(),
        rule_count: config.wiring.len(),
        worker_count: config.operators.iter().map(|op| op.workers.len()).sum(),
    }
    .log();

    let graph = EventGraph::from_config(config);
    let mut report = ValidationReport::default();

    report.errors.extend(check_vocabulary(&graph));
    report.errors.extend(check_publishers(&graph));
    report.errors.extend(check_cycles(&graph));
    report.errors.extend(check_payload_types(&graph));
    report.warnings.extend(check_dead_ends(&graph));

    ValidationCompleted {
        error_count: report.errors.len(),
        warning_count: report.warnings.len(),
        duration: started.elapsed(),
    }
    .log();

    report
}

fn check_vocabulary(graph: &EventGraph) -> Vec<EventChainError> {
    graph
        .references()
        .filter(|(event, _)| !graph.is_defined(event))
        .map(|(event, referrers)| EventChainError::UndefinedEvent {
            event: event.to_string(),
            referenced_by: joined(referrers),
        })
        .collect()
}

fn check_publishers(graph: &EventGraph) -> Vec<EventChainError> {
    graph
        .subscribed_events()
        .filter(|(event, _)| graph.publishers_of(event).map_or(true, |p| p.is_empty()))
        .map(|(event, subscribers)| EventChainError::MissingPublisher {
            event: event.to_string(),
            subscribers: subscribers.iter().cloned().collect(),
        })
        .collect()
}

fn check_dead_ends(graph: &EventGraph) -> Vec<EventChainWarning> {
    graph
        .published_events()
        .filter(|(event, _)| graph.subscribers_of(event).map_or(true, |s| s.is_empty()))
        .map(|(event, publishers)| EventChainWarning::DeadEnd {
            event: event.to_string(),
            publishers: publishers.iter().cloned().collect(),
        })
        .collect()
}

fn check_payload_types(graph: &EventGraph) -> Vec<EventChainError> {
    graph
        .payload_declarations()
        .filter(|(_, declarations)| {
            declarations
                .iter()
                .map(|(_, payload_type)| payload_type)
                .collect::<BTreeSet<_>>()
                .len()
                > 1
        })
        .map(|(event, declarations)| EventChainError::ConflictingPayloadTypes {
            event: event.to_string(),
            declarations: declarations.iter().cloned().collect(),
        })
        .collect()
}

fn check_cycles(graph: &EventGraph) -> Vec<EventChainError> {
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for event in graph.edge_sources() {
        if !visited.contains(event) {
            dfs_cycle_detection(
                event,
                graph,
                &mut visited,
                &mut rec_stack,
                &mut path,
                &mut cycles,
            );
        }
    }

    cycles
        .into_iter()
        .map(|cycle| EventChainError::CircularDependency { cycle })
        .collect()
}

fn dfs_cycle_detection<'g>(
    node: &'g str,
    graph: &'g EventGraph,
    visited: &mut HashSet<&'g str>,
    rec_stack: &mut HashSet<&'g str>,
    path: &mut Vec<&'g str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    for neighbor in graph.downstream_of(node) {
        if !visited.contains(neighbor) {
            dfs_cycle_detection(neighbor, graph, visited, rec_stack, path, cycles);
        } else if rec_stack.contains(neighbor) {
            if let Some(cycle_start) = path.iter().position(|x| *x == neighbor) {
                let mut cycle: Vec<String> =
                    path[cycle_start..].iter().map(|s| s.to_string()).collect();
                cycle.push(neighbor.to_string());
                cycles.push(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
}

fn joined(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AggregationStrategy, EventDefinition, EventPublication, ExecutionStrategy, OperatorConfig,
        RuntimeOptions, WiringRule, WorkerDescriptor,
    };
    use crate::traits::WorkerKind;

    fn empty_config() -> SystemConfig {
        SystemConfig {
            unit_id: "unit".into(),
            data_dir: "/tmp".into(),
            runtime: RuntimeOptions::default(),
            events: vec![],
            operators: vec![],
            wiring: vec![],
            schedules: vec![],
        }
    }

    fn define(config: &mut SystemConfig, name: &str, category: &str) {
        config.events.push(EventDefinition {
            name: name.into(),
            payload_type: "Value".into(),
            category: category.into(),
        });
    }

    fn rule(id: &str, from: &str, to: Option<&str>) -> WiringRule {
        WiringRule {
            adapter_id: id.into(),
            listens_to: from.into(),
            target: "ops".into(),
            method: "run_pipeline".into(),
            publishes: to.map(String::from),
        }
    }

    fn worker(id: &str, publishes: Vec<(&str, Option<&str>)>, subscribes: Vec<&str>) -> WorkerDescriptor {
        WorkerDescriptor {
            id: id.into(),
            implementation: "constant".into(),
            role: WorkerKind::Standard,
            capabilities: Default::default(),
            requires: vec![],
            produces: vec![],
            publishes: publishes
                .into_iter()
                .map(|(event, payload_type)| EventPublication {
                    event: event.into(),
                    payload_type: payload_type.map(String::from),
                })
                .collect(),
            subscribes: subscribes.into_iter().map(String::from).collect(),
            params: serde_json::Value::Null,
        }
    }

    fn with_workers(config: &mut SystemConfig, workers: Vec<WorkerDescriptor>) {
        config.operators.push(OperatorConfig {
            id: "ops".into(),
            manages: "test".into(),
            execution: ExecutionStrategy::Parallel,
            aggregation: AggregationStrategy::CollectAll,
            workers,
        });
    }

    #[test]
    fn test_valid_empty_config() {
        let report = validate_event_chain(&empty_config());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_subscriber_without_publisher_is_one_error() {
        let mut config = empty_config();
        define(&mut config, "fill", "internal");
        with_workers(&mut config, vec![worker("a", vec![], vec!["fill"]), worker("b", vec![], vec!["fill"])]);

        let report = validate_event_chain(&config);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            EventChainError::MissingPublisher { event, subscribers }
                if event == "fill" && subscribers == &vec!["a".to_string(), "b".to_string()]
        ));
        assert!(report.errors[0].to_string().contains("fill"));
    }

    #[test]
    fn test_publisher_without_subscriber_is_one_warning() {
        let mut config = empty_config();
        define(&mut config, "telemetry", "internal");
        with_workers(&mut config, vec![worker("sensor", vec![("telemetry", None)], vec![])]);

        let report = validate_event_chain(&config);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![EventChainWarning::DeadEnd {
                event: "telemetry".into(),
                publishers: vec!["sensor".into()],
            }]
        );
    }

    #[test]
    fn test_three_node_cycle_is_one_error_in_path_order() {
        let mut config = empty_config();
        for name in ["A", "B", "C"] {
            define(&mut config, name, "internal");
        }
        config.wiring = vec![
            rule("a_to_b", "A", Some("B")),
            rule("b_to_c", "B", Some("C")),
            rule("c_to_a", "C", Some("A")),
        ];

        let report = validate_event_chain(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0],
            EventChainError::CircularDependency {
                cycle: vec!["A".into(), "B".into(), "C".into(), "A".into()],
            }
        );
        assert!(report.errors[0].to_string().contains("A → B → C → A"));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut config = empty_config();
        define(&mut config, "retry", "external");
        config.wiring = vec![rule("again", "retry", Some("retry"))];

        let report = validate_event_chain(&config);
        assert_eq!(
            report.errors,
            vec![EventChainError::CircularDependency {
                cycle: vec!["retry".into(), "retry".into()],
            }]
        );
    }

    #[test]
    fn test_linear_chain_is_valid() {
        let mut config = empty_config();
        define(&mut config, "tick", "external");
        define(&mut config, "signal", "internal");
        config.wiring = vec![rule("detect", "tick", Some("signal")), rule("plan", "signal", None)];

        let report = validate_event_chain(&config);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_conflicting_payload_types() {
        let mut config = empty_config();
        define(&mut config, "quote", "internal");
        with_workers(
            &mut config,
            vec![
                worker("left", vec![("quote", Some("Bid"))], vec!["quote"]),
                worker("right", vec![("quote", Some("Ask"))], vec![]),
            ],
        );

        let report = validate_event_chain(&config);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0],
            EventChainError::ConflictingPayloadTypes {
                event: "quote".into(),
                declarations: vec![
                    ("left".into(), "Bid".into()),
                    ("right".into(), "Ask".into()),
                ],
            }
        );
    }

    #[test]
    fn test_matching_payload_types_are_fine() {
        let mut config = empty_config();
        define(&mut config, "quote", "internal");
        with_workers(
            &mut config,
            vec![
                worker("left", vec![("quote", Some("Quote"))], vec!["quote"]),
                worker("right", vec![("quote", Some("Quote"))], vec![]),
            ],
        );

        assert!(validate_event_chain(&config).is_valid());
    }

    #[test]
    fn test_undefined_event_is_reported_once() {
        let mut config = empty_config();
        define(&mut config, "tick", "external");
        config.wiring = vec![rule("x", "tick", Some("ghost")), rule("y", "ghost", None)];

        let report = validate_event_chain(&config);
        assert_eq!(
            report.errors,
            vec![EventChainError::UndefinedEvent {
                event: "ghost".into(),
                referenced_by: "x, y".into(),
            }]
        );
    }

    #[test]
    fn test_external_definition_counts_as_publisher() {
        let mut config = empty_config();
        define(&mut config, "order_filled", "external");
        config.wiring = vec![rule("book", "order_filled", None)];

        assert!(validate_event_chain(&config).is_valid());
    }

    #[test]
    fn test_all_defects_reported_together() {
        let mut config = empty_config();
        for name in ["A", "B", "orphan"] {
            define(&mut config, name, "internal");
        }
        config.wiring = vec![rule("ab", "A", Some("B")), rule("ba", "B", Some("A"))];
        with_workers(&mut config, vec![worker("lonely", vec![], vec!["orphan"])]);

        let report = validate_event_chain(&config);
        assert_eq!(report.errors.len(), 2);

        let error = report.into_result().unwrap_err();
        let text = error.to_string();
        assert!(text.contains("orphan"));
        assert!(text.contains("A → B → A"));
    }
}
