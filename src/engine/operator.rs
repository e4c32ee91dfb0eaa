// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::config::{AggregationStrategy, ExecutionStrategy, OperatorConfig};
use crate::errors::{ConfigurationError, WorkerError, WorkerExecutionError};
use crate::events::{causal_scope, current_causal_ids};
use crate::observability::messages::engine::{
    ContributionOmitted, EventDrivenRunSkipped, OperatorCreated, PipelineAborted,
    PipelineCompleted, PipelineStarted,
};
use crate::observability::messages::worker::{WorkerExecutionCompleted, WorkerExecutionFailed};
use crate::observability::messages::StructuredLog;
use crate::workers::PipelineWorker;

/// The one generic orchestrator.
///
/// An operator runs its pipeline workers according to its execution strategy
/// and combines their outputs according to its aggregation strategy. Only
/// three combinations are meaningful and accepted:
///
/// | Execution | Aggregation | Behavior |
/// |-----------|-------------|----------|
/// | `SEQUENTIAL` | `CHAIN_THROUGH` | Declared order, each output feeds the next worker, fail-fast |
/// | `PARALLEL` | `COLLECT_ALL` | Concurrent, same input for all, failures omitted, outputs flattened in declared order |
/// | `EVENT_DRIVEN` | `NONE` | Never runs workers; adapters drive its autonomous workers |
pub struct Operator {
    id: String,
    execution: ExecutionStrategy,
    aggregation: AggregationStrategy,
    workers: Vec<PipelineWorker>,
    pool_size: usize,
}

impl Operator {
    /// Build an operator over its pipeline workers.
    ///
    /// `pool_cap` bounds PARALLEL concurrency; the effective pool size is
    /// `min(workers, pool_cap)`, never less than one.
    pub fn new(
        config: &OperatorConfig,
        workers: Vec<PipelineWorker>,
        pool_cap: usize,
    ) -> Result<Self, ConfigurationError> {
        use AggregationStrategy as A;
        use ExecutionStrategy as E;

        match (config.execution, config.aggregation) {
            (E::Sequential, A::ChainThrough) | (E::Parallel, A::CollectAll) => {}
            (E::EventDriven, A::None) => {
                if !workers.is_empty() {
                    return Err(ConfigurationError::EventDrivenOperatorWithWorkers {
                        operator_id: config.id.clone(),
                        count: workers.len(),
                    });
                }
            }
            (execution, aggregation) => {
                return Err(ConfigurationError::UnsupportedStrategy {
                    operator_id: config.id.clone(),
                    execution,
                    aggregation,
                })
            }
        }

        let pool_size = workers.len().min(pool_cap).max(1);
        let operator = Self {
            id: config.id.clone(),
            execution: config.execution,
            aggregation: config.aggregation,
            workers,
            pool_size,
        };

        OperatorCreated {
            operator_id: &operator.id,
            execution: &operator.execution.to_string(),
            aggregation: &operator.aggregation.to_string(),
            worker_count: operator.workers.len(),
            pool_size: operator.pool_size,
        }
        .log();

        Ok(operator)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn execution(&self) -> ExecutionStrategy {
        self.execution
    }

    pub fn aggregation(&self) -> AggregationStrategy {
        self.aggregation
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Pipeline worker ids in declaration order
    pub fn worker_ids(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.id.as_str()).collect()
    }

    /// Run the pipeline once over `input`.
    ///
    /// SEQUENTIAL returns the last worker's output, or `input` unchanged
    /// when there are no workers. PARALLEL returns an array of surviving
    /// contributions. EVENT_DRIVEN returns `Null`.
    pub async fn run_pipeline(&self, input: Value) -> Result<Value, WorkerExecutionError> {
        if self.execution == ExecutionStrategy::EventDriven {
            EventDrivenRunSkipped {
                operator_id: &self.id,
            }
            .log();
            return Ok(Value::Null);
        }

        let execution = self.execution.to_string();
        PipelineStarted {
            operator_id: &self.id,
            execution: &execution,
            worker_count: self.workers.len(),
        }
        .log();
        let started = Instant::now();

        let (output, contributions) = match self.execution {
            ExecutionStrategy::Parallel => {
                let contributions = self.run_parallel(input).await;
                let count = contributions.len();
                (collect_all(contributions), count)
            }
            _ => (self.run_sequential(input).await?, self.workers.len()),
        };

        PipelineCompleted {
            operator_id: &self.id,
            execution: &execution,
            contributions,
            duration: started.elapsed(),
        }
        .log();

        Ok(output)
    }

    async fn run_sequential(&self, input: Value) -> Result<Value, WorkerExecutionError> {
        let mut current = input;

        for (index, worker) in self.workers.iter().enumerate() {
            let started = Instant::now();
            match worker.worker.process(current.clone()).await {
                Ok(output) => {
                    WorkerExecutionCompleted {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        duration: started.elapsed(),
                    }
                    .log();
                    current = output;
                }
                Err(source) => {
                    WorkerExecutionFailed {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        input: &current,
                        error: &source,
                    }
                    .log();
                    PipelineAborted {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        remaining_workers: self.workers.len() - index - 1,
                    }
                    .log();
                    return Err(WorkerExecutionError {
                        operator_id: self.id.clone(),
                        worker_id: worker.id.clone(),
                        input: current,
                        source,
                    });
                }
            }
        }

        Ok(current)
    }

    /// Outputs of the workers that succeeded, in declaration order.
    async fn run_parallel(&self, input: Value) -> Vec<Value> {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let input = Arc::new(input);
        let causal_ids = current_causal_ids();
        let mut tasks = Vec::with_capacity(self.workers.len());

        for worker in &self.workers {
            let worker = worker.worker.clone();
            let input = input.clone();
            let semaphore = semaphore.clone();

            // task-locals do not follow spawn
            tasks.push(tokio::spawn(causal_scope(causal_ids.clone(), async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| WorkerError::Failed(format!("worker pool closed: {}", e)))?;
                let started = Instant::now();
                let output = worker.process(input.as_ref().clone()).await?;
                Ok::<_, WorkerError>((output, started.elapsed()))
            })));
        }

        let mut contributions = Vec::with_capacity(tasks.len());
        for (worker, task) in self.workers.iter().zip(tasks) {
            match task.await {
                Ok(Ok((output, duration))) => {
                    WorkerExecutionCompleted {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        duration,
                    }
                    .log();
                    contributions.push(output);
                }
                Ok(Err(error)) => {
                    WorkerExecutionFailed {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        input: input.as_ref(),
                        error: &error,
                    }
                    .log();
                    ContributionOmitted {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        reason: &error.to_string(),
                    }
                    .log();
                }
                Err(join_error) => {
                    let error = WorkerError::Failed(join_error.to_string());
                    WorkerExecutionFailed {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        input: input.as_ref(),
                        error: &error,
                    }
                    .log();
                    ContributionOmitted {
                        operator_id: &self.id,
                        worker_id: &worker.id,
                        reason: &error.to_string(),
                    }
                    .log();
                }
            }
        }

        contributions
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("id", &self.id)
            .field("execution", &self.execution)
            .field("aggregation", &self.aggregation)
            .field("workers", &self.worker_ids())
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Flatten contributions into one array.
///
/// Arrays contribute their elements in order; `null`, `[]` and `{}`
/// contribute nothing; any other value contributes itself.
fn collect_all(contributions: Vec<Value>) -> Value {
    let mut collected = Vec::new();
    for contribution in contributions {
        match contribution {
            Value::Null => {}
            Value::Array(items) => collected.extend(items),
            Value::Object(ref map) if map.is_empty() => {}
            other => collected.push(other),
        }
    }
    Value::Array(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::builtin::{Arithmetic, ArithmeticOp};
    use crate::events::{CausalId, CausalKind};
    use crate::workers::stub::{FailingWorker, LineageWorker, PanickingWorker, RecordingWorker, StaticWorker};
    use crate::traits::StandardWorker;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn config(execution: &str, aggregation: &str) -> OperatorConfig {
        serde_json::from_value(json!({
            "id": "op",
            "execution": execution,
            "aggregation": aggregation,
        }))
        .unwrap()
    }

    fn worker(id: &str, worker: impl StandardWorker + 'static) -> PipelineWorker {
        PipelineWorker {
            id: id.to_string(),
            worker: Arc::new(worker),
        }
    }

    fn arithmetic(op: ArithmeticOp, operand: i64) -> Arithmetic {
        Arithmetic::new(op, operand.into())
    }

    #[tokio::test]
    async fn sequential_chains_outputs() {
        let operator = Operator::new(
            &config("SEQUENTIAL", "CHAIN_THROUGH"),
            vec![
                worker("add", arithmetic(ArithmeticOp::Add, 1)),
                worker("mul", arithmetic(ArithmeticOp::Multiply, 2)),
                worker("sub", arithmetic(ArithmeticOp::Subtract, 3)),
            ],
            4,
        )
        .unwrap();

        assert_eq!(operator.run_pipeline(json!(5)).await.unwrap(), json!(9));
    }

    #[tokio::test]
    async fn empty_sequential_returns_input() {
        let operator = Operator::new(&config("SEQUENTIAL", "CHAIN_THROUGH"), vec![], 4).unwrap();
        assert_eq!(operator.run_pipeline(json!("x")).await.unwrap(), json!("x"));
    }

    #[tokio::test]
    async fn sequential_failure_stops_the_chain() {
        let downstream = RecordingWorker::default();
        let seen = downstream.seen.clone();
        let operator = Operator::new(
            &config("SEQUENTIAL", "CHAIN_THROUGH"),
            vec![
                worker("add", arithmetic(ArithmeticOp::Add, 1)),
                worker("broken", FailingWorker::new()),
                worker("after", downstream),
            ],
            4,
        )
        .unwrap();

        let error = operator.run_pipeline(json!(5)).await.unwrap_err();
        assert_eq!(error.operator_id, "op");
        assert_eq!(error.worker_id, "broken");
        assert_eq!(error.input, json!(6));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn parallel_flattens_in_declared_order() {
        let operator = Operator::new(
            &config("PARALLEL", "COLLECT_ALL"),
            vec![
                worker("a", StaticWorker::new(json!([1]))),
                worker("b", StaticWorker::new(json!([]))),
                worker("c", StaticWorker::new(json!([2, 3]))),
            ],
            4,
        )
        .unwrap();

        assert_eq!(operator.run_pipeline(json!(null)).await.unwrap(), json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn parallel_order_ignores_completion_order() {
        let operator = Operator::new(
            &config("PARALLEL", "COLLECT_ALL"),
            vec![
                worker("slow", StaticWorker::delayed(json!("slow"), Duration::from_millis(50))),
                worker("fast", StaticWorker::new(json!("fast"))),
            ],
            4,
        )
        .unwrap();

        assert_eq!(
            operator.run_pipeline(json!(null)).await.unwrap(),
            json!(["slow", "fast"])
        );
    }

    #[tokio::test]
    async fn parallel_omits_failed_and_panicked_workers() {
        let failing = FailingWorker::new();
        let calls = failing.calls.clone();
        let operator = Operator::new(
            &config("PARALLEL", "COLLECT_ALL"),
            vec![
                worker("a", StaticWorker::new(json!(1))),
                worker("broken", failing),
                worker("panics", PanickingWorker),
                worker("b", StaticWorker::new(json!({"k": 2}))),
                worker("empty", StaticWorker::new(json!({}))),
            ],
            2,
        )
        .unwrap();

        let output = operator.run_pipeline(json!(null)).await.unwrap();
        assert_eq!(output, json!([1, {"k": 2}]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn parallel_workers_see_the_caller_causal_ids() {
        let operator = Operator::new(
            &config("PARALLEL", "COLLECT_ALL"),
            vec![worker("a", LineageWorker), worker("b", LineageWorker)],
            2,
        )
        .unwrap();
        let origin = CausalId::new(CausalKind::WorkItem);

        let output = causal_scope(vec![origin], operator.run_pipeline(json!(null)))
            .await
            .unwrap();
        assert_eq!(output, json!([origin.to_string(), origin.to_string()]));
    }

    #[test]
    fn pool_size_is_bounded_by_cap_and_worker_count() {
        let workers = || {
            (0..3)
                .map(|i| worker(&format!("w{}", i), StaticWorker::new(json!(i))))
                .collect::<Vec<_>>()
        };
        let parallel = config("PARALLEL", "COLLECT_ALL");

        assert_eq!(Operator::new(&parallel, workers(), 8).unwrap().pool_size(), 3);
        assert_eq!(Operator::new(&parallel, workers(), 2).unwrap().pool_size(), 2);
        assert_eq!(Operator::new(&parallel, vec![], 8).unwrap().pool_size(), 1);
    }

    #[test]
    fn invalid_combinations_are_rejected() {
        for (execution, aggregation) in [
            ("SEQUENTIAL", "COLLECT_ALL"),
            ("PARALLEL", "CHAIN_THROUGH"),
            ("EVENT_DRIVEN", "CHAIN_THROUGH"),
            ("SEQUENTIAL", "NONE"),
        ] {
            let error = Operator::new(&config(execution, aggregation), vec![], 4).unwrap_err();
            assert!(
                matches!(error, ConfigurationError::UnsupportedStrategy { .. }),
                "{}/{} should be rejected",
                execution,
                aggregation
            );
        }
    }

    #[tokio::test]
    async fn event_driven_operator_never_runs_workers() {
        let config = config("EVENT_DRIVEN", "NONE");

        let error = Operator::new(&config, vec![worker("w", StaticWorker::new(json!(1)))], 4)
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::EventDrivenOperatorWithWorkers { count: 1, .. }
        ));

        let operator = Operator::new(&config, vec![], 4).unwrap();
        assert_eq!(operator.run_pipeline(json!(5)).await.unwrap(), Value::Null);
    }
}
