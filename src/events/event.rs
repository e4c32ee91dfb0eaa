// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What a causal identifier was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalKind {
    Opportunity,
    Threat,
    WorkItem,
    Schedule,
}

impl CausalKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CausalKind::Opportunity => "opp",
            CausalKind::Threat => "thr",
            CausalKind::WorkItem => "wrk",
            CausalKind::Schedule => "sch",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "opp" => Some(CausalKind::Opportunity),
            "thr" => Some(CausalKind::Threat),
            "wrk" => Some(CausalKind::WorkItem),
            "sch" => Some(CausalKind::Schedule),
            _ => None,
        }
    }
}

/// Globally unique token stamped onto a unit of work when it is created and
/// carried through every downstream event and journal entry.
///
/// Renders as `<prefix>-<uuid>`, e.g. `opp-550e8400-e29b-41d4-a716-446655440000`.
///
/// ```
/// use the_foreman::events::{CausalId, CausalKind};
///
/// let id = CausalId::new(CausalKind::Threat);
/// let parsed: CausalId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// assert!(id.to_string().starts_with("thr-"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CausalId {
    kind: CausalKind,
    id: Uuid,
}

impl CausalId {
    pub fn new(kind: CausalKind) -> Self {
        Self {
            kind,
            id: Uuid::new_v4(),
        }
    }

    pub fn kind(&self) -> CausalKind {
        self.kind
    }
}

impl fmt::Display for CausalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for CausalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| format!("Malformed causal id '{}'", s))?;
        let kind = CausalKind::from_prefix(prefix)
            .ok_or_else(|| format!("Unknown causal id prefix '{}' in '{}'", prefix, s))?;
        let id = Uuid::parse_str(rest).map_err(|e| format!("Malformed causal id '{}': {}", s, e))?;
        Ok(Self { kind, id })
    }
}

impl From<CausalId> for String {
    fn from(id: CausalId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CausalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named, timestamped payload travelling over the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub payload: Value,
    #[serde(default)]
    pub causal_ids: Vec<CausalId>,
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
            causal_ids: Vec::new(),
            emitted_at: Utc::now(),
        }
    }

    pub fn with_causal_ids(mut self, causal_ids: Vec<CausalId>) -> Self {
        self.causal_ids = causal_ids;
        self
    }

    /// A follow-up event that carries `parent`'s causal ids forward.
    pub fn derived(name: impl Into<String>, payload: Value, parent: &Event) -> Self {
        Self::new(name, payload).with_causal_ids(parent.causal_ids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn causal_id_prefixes() {
        assert!(CausalId::new(CausalKind::Opportunity).to_string().starts_with("opp-"));
        assert!(CausalId::new(CausalKind::WorkItem).to_string().starts_with("wrk-"));
        assert!(CausalId::new(CausalKind::Schedule).to_string().starts_with("sch-"));
    }

    #[test]
    fn causal_ids_are_unique() {
        let a = CausalId::new(CausalKind::Opportunity);
        let b = CausalId::new(CausalKind::Opportunity);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_causal_ids_are_rejected() {
        assert!("nope".parse::<CausalId>().is_err());
        assert!("xyz-550e8400-e29b-41d4-a716-446655440000".parse::<CausalId>().is_err());
        assert!("opp-not-a-uuid".parse::<CausalId>().is_err());
    }

    #[test]
    fn causal_id_serializes_as_string() {
        let id = CausalId::new(CausalKind::Threat);
        let value = serde_json::to_value(id).unwrap();
        assert_eq!(value, json!(id.to_string()));
        let back: CausalId = serde_json::from_value(value).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn derived_event_carries_causal_ids() {
        let origin = CausalId::new(CausalKind::Opportunity);
        let parent = Event::new("signal", json!({"side": "buy"})).with_causal_ids(vec![origin]);

        let child = Event::derived("plan", json!(42), &parent);

        assert_eq!(child.name, "plan");
        assert_eq!(child.payload, json!(42));
        assert_eq!(child.causal_ids, vec![origin]);
    }
}
