// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::events::CausalId;

/// One immutable journal record.
///
/// Appended, never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalEntry {
    pub timestamp: DateTime<Utc>,
    /// What happened, usually the triggering event's name
    pub event_type: String,
    #[serde(default)]
    pub causal_ids: Vec<CausalId>,
    #[serde(default)]
    pub detail: Value,
}

impl CausalEntry {
    pub fn new(event_type: impl Into<String>, causal_ids: Vec<CausalId>, detail: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.into(),
            causal_ids,
            detail,
        }
    }
}

/// Ledger record: the current state of one unit of work.
///
/// Mutated frequently, holds no history, always reflects "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalState {
    pub unit_id: String,
    #[serde(default)]
    pub open_items: Vec<Value>,
    #[serde(default)]
    pub totals: BTreeMap<String, f64>,
    pub updated_at: DateTime<Utc>,
}

impl OperationalState {
    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            open_items: Vec::new(),
            totals: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn total(&self, key: &str) -> f64 {
        self.totals.get(key).copied().unwrap_or(0.0)
    }

    /// Add `amount` to the named total and stamp the update time.
    pub fn accumulate(&mut self, key: &str, amount: f64) -> f64 {
        let total = self.totals.entry(key.to_string()).or_insert(0.0);
        *total += amount;
        self.updated_at = Utc::now();
        *total
    }
}

/// One timestamped row handed to a bulk store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkRecord {
    pub timestamp: DateTime<Utc>,
    pub fields: Value,
}
