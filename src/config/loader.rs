// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{EventDefinition, OperatorConfig, ScheduleConfig, WiringRule};
use crate::errors::LoadError;

/// Complete configuration for one unit of work.
///
/// The core only ever consumes this in-memory value; [`load_config`] is a
/// convenience for the binary and tests.
///
/// # Fields
/// * `unit_id` - Identifier of the tracked unit of work, names its journal
/// * `data_dir` - Root directory for state files and journals
/// * `runtime` - Concurrency options (optional)
/// * `events` - The event vocabulary
/// * `operators` - Operators and their worker descriptors
/// * `wiring` - Event adapter rules
/// * `schedules` - Time-based event sources
///
/// # Example
/// ```yaml
/// unit_id: btc_usd
/// data_dir: /var/lib/foreman
/// runtime:
///   max_parallelism: 4
/// events:
///   - name: market_tick
///     payload_type: Tick
///     category: external
/// operators:
///   - id: signal_detection
///     execution: PARALLEL
///     aggregation: COLLECT_ALL
///     workers: []
/// wiring:
///   - adapter_id: detect
///     listens_to: market_tick
///     target: signal_detection
///     method: run_pipeline
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub unit_id: String,
    pub data_dir: PathBuf,
    #[serde(default)]
    pub runtime: RuntimeOptions,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
    #[serde(default)]
    pub wiring: Vec<WiringRule>,
    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,
}

/// Concurrency options. Unset values resolve to built-in defaults.
///
/// # Fields
/// * `max_parallelism` - Pool cap for PARALLEL operators
/// * `adapter_concurrency` - Adapter invocations allowed in flight at once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    pub max_parallelism: Option<usize>,
    pub adapter_concurrency: Option<usize>,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExecutionStrategy, ScheduleTrigger};

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
unit_id: btc_usd
data_dir: /tmp/foreman
events:
  - name: tick
    payload_type: Tick
    category: external
operators:
  - id: math
    manages: calculators
    execution: SEQUENTIAL
    aggregation: CHAIN_THROUGH
    workers:
      - id: plus_one
        implementation: add
        role: STANDARD
        params: { operand: 1 }
schedules:
  - name: heartbeat
    event: tick
    trigger:
      interval:
        every_ms: 1000
"#;

        let cfg: SystemConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.unit_id, "btc_usd");
        assert_eq!(cfg.runtime, RuntimeOptions::default());
        assert_eq!(cfg.operators.len(), 1);
        assert_eq!(cfg.operators[0].execution, ExecutionStrategy::Sequential);
        assert_eq!(cfg.operators[0].workers[0].params["operand"], 1);
        assert!(cfg.wiring.is_empty());
        assert_eq!(
            cfg.schedules[0].trigger,
            ScheduleTrigger::Interval { every_ms: 1000 }
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.yaml");

        let error = load_config(&missing).unwrap_err();
        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().contains("absent.yaml"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "unit_id: [unterminated").unwrap();

        let error = load_config(&path).unwrap_err();
        assert!(matches!(error, LoadError::Parse { .. }));
    }
}
