// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::WorkerDescriptor;

/// Configuration for a single operator.
///
/// An operator is the one generic orchestrator type: it runs its configured
/// workers according to `execution` and combines their outputs according to
/// `aggregation`. Operators are immutable once loaded.
///
/// # Fields
/// * `id` - Unique identifier, also the target name wiring rules use
/// * `manages` - Tag naming the kind of worker this operator manages
/// * `execution` - How workers are invoked
/// * `aggregation` - How worker outputs are combined
/// * `workers` - Worker descriptors, in declaration order
///
/// # Example
/// ```yaml
/// id: signal_detection
/// manages: detectors
/// execution: PARALLEL
/// aggregation: COLLECT_ALL
/// workers:
///   - id: momentum
///     implementation: constant
///     role: STANDARD
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub id: String,
    #[serde(default)]
    pub manages: String,
    pub execution: ExecutionStrategy,
    pub aggregation: AggregationStrategy,
    #[serde(default)]
    pub workers: Vec<WorkerDescriptor>,
}

/// How an operator invokes its workers.
///
/// # Variants
/// * `Sequential` - Declared order, output of one worker feeds the next
/// * `Parallel` - Concurrently, every worker receives the same input
/// * `EventDriven` - Never runs workers itself; adapters drive autonomous workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStrategy {
    Sequential,
    Parallel,
    EventDriven,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStrategy::Sequential => write!(f, "SEQUENTIAL"),
            ExecutionStrategy::Parallel => write!(f, "PARALLEL"),
            ExecutionStrategy::EventDriven => write!(f, "EVENT_DRIVEN"),
        }
    }
}

/// How an operator combines worker outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationStrategy {
    ChainThrough,
    CollectAll,
    None,
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationStrategy::ChainThrough => write!(f, "CHAIN_THROUGH"),
            AggregationStrategy::CollectAll => write!(f, "COLLECT_ALL"),
            AggregationStrategy::None => write!(f, "NONE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_use_screaming_snake_case() {
        let yaml = r#"
id: planner
manages: planners
execution: EVENT_DRIVEN
aggregation: NONE
"#;
        let cfg: OperatorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.execution, ExecutionStrategy::EventDriven);
        assert_eq!(cfg.aggregation, AggregationStrategy::None);
        assert!(cfg.workers.is_empty());
        assert_eq!(cfg.execution.to_string(), "EVENT_DRIVEN");
        assert_eq!(AggregationStrategy::CollectAll.to_string(), "COLLECT_ALL");
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let yaml = r#"
id: planner
execution: ROUND_ROBIN
aggregation: NONE
"#;
        let result: Result<OperatorConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
