// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::config::consts::{EXTERNAL_CATEGORY, INTERNAL_CATEGORY};

/// One entry in the event vocabulary. An event name absent from the
/// definitions is illegal anywhere in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    pub payload_type: String,
    /// `external` marks events injected by an outside driver
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    INTERNAL_CATEGORY.to_string()
}

impl EventDefinition {
    pub fn is_external(&self) -> bool {
        self.category == EXTERNAL_CATEGORY
    }
}

/// Routing rule: on `listens_to`, invoke `method` on `target` and optionally
/// republish the return value as `publishes`.
///
/// `target` names either an operator (method `run_pipeline`) or an
/// autonomous worker (one of its declared methods).
///
/// # Example
/// ```yaml
/// adapter_id: detect_on_tick
/// listens_to: market_tick
/// target: signal_detection
/// method: run_pipeline
/// publishes: signals_detected
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiringRule {
    pub adapter_id: String,
    pub listens_to: String,
    pub target: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishes: Option<String>,
}

/// A time-based event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub name: String,
    /// Event published on every trigger
    pub event: String,
    pub trigger: ScheduleTrigger,
}

/// When a schedule fires.
///
/// # Variants
/// * `Interval` - Fixed period in milliseconds
/// * `Calendar` - Cron expression with a leading seconds field
///
/// # Example
/// ```yaml
/// trigger:
///   calendar:
///     expression: "0 0 9 * * Mon-Fri"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleTrigger {
    Interval { every_ms: u64 },
    Calendar { expression: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_to_internal() {
        let definition: EventDefinition =
            serde_yaml::from_str("name: tick\npayload_type: Tick\n").unwrap();
        assert_eq!(definition.category, "internal");
        assert!(!definition.is_external());
    }

    #[test]
    fn schedule_triggers_parse() {
        let yaml = r#"
- name: heartbeat
  event: tick
  trigger:
    interval:
      every_ms: 250
- name: open
  event: market_open
  trigger:
    calendar:
      expression: "0 30 9 * * Mon-Fri"
"#;
        let schedules: Vec<ScheduleConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedules[0].trigger, ScheduleTrigger::Interval { every_ms: 250 });
        assert!(matches!(
            &schedules[1].trigger,
            ScheduleTrigger::Calendar { expression } if expression == "0 30 9 * * Mon-Fri"
        ));
    }

    #[test]
    fn wiring_rule_result_event_is_optional() {
        let yaml = r#"
adapter_id: record
listens_to: fill
target: recorder
method: record
"#;
        let rule: WiringRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.publishes, None);
    }
}
