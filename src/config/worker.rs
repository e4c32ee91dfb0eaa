// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::{Capability, WorkerKind};

/// Declarative description of one worker.
///
/// Created from configuration at boot and never mutated after the worker is
/// constructed. The declared `role` is checked against the implementation's
/// structural role and the enabled `capabilities` against the capability
/// interfaces the implementation satisfies.
///
/// # Example
/// ```yaml
/// id: ledger
/// implementation: running_total
/// role: STANDARD
/// capabilities:
///   state: true
///   events: true
/// publishes:
///   - event: total_updated
///     payload_type: Total
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDescriptor {
    pub id: String,
    /// Identifier the implementation is registered under
    pub implementation: String,
    pub role: WorkerKind,
    #[serde(default)]
    pub capabilities: CapabilityFlags,
    /// Input fields this worker requires
    #[serde(default)]
    pub requires: Vec<String>,
    /// Output fields this worker produces
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub publishes: Vec<EventPublication>,
    #[serde(default)]
    pub subscribes: Vec<String>,
    /// Construction parameters handed to the implementation's factory
    #[serde(default)]
    pub params: Value,
}

/// Capability switches. All default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFlags {
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub events: bool,
    #[serde(default)]
    pub history: bool,
}

impl CapabilityFlags {
    /// Enabled capabilities in attachment order: state, events, history.
    pub fn enabled(&self) -> Vec<Capability> {
        let mut enabled = Vec::new();
        if self.state {
            enabled.push(Capability::State);
        }
        if self.events {
            enabled.push(Capability::Events);
        }
        if self.history {
            enabled.push(Capability::History);
        }
        enabled
    }
}

/// An event a worker declares it publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPublication {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let yaml = r#"
id: adder
implementation: add
role: STANDARD
"#;
        let descriptor: WorkerDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.role, WorkerKind::Standard);
        assert_eq!(descriptor.capabilities, CapabilityFlags::default());
        assert!(descriptor.publishes.is_empty());
        assert!(descriptor.params.is_null());
    }

    #[test]
    fn enabled_capabilities_follow_attachment_order() {
        let flags = CapabilityFlags {
            state: true,
            events: false,
            history: true,
        };
        assert_eq!(flags.enabled(), vec![Capability::State, Capability::History]);
    }

    #[test]
    fn params_accept_nested_yaml() {
        let yaml = r#"
id: adder
implementation: add
role: STANDARD
params:
  operand: 3
  tags: [a, b]
"#;
        let descriptor: WorkerDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.params["operand"], serde_json::json!(3));
        assert_eq!(descriptor.params["tags"][1], serde_json::json!("b"));
    }
}
