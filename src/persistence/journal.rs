// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::path::Path;

use crate::errors::PersistenceError;
use crate::observability::messages::persistence::JournalAppended;
use crate::observability::messages::StructuredLog;
use crate::persistence::{AtomicFileStore, CausalEntry};
use crate::traits::{LogStore, ObjectStore};

/// Append-only journal of [`CausalEntry`] records in one JSON array file.
///
/// Each append loads the full array, extends it in memory and commits it
/// through [`AtomicFileStore::update`]. That costs O(n) per append but reuses
/// the atomic store's durability and locking; prior entries are copied
/// verbatim and never rewritten in content.
pub struct JournalFileStore {
    store: AtomicFileStore,
}

impl JournalFileStore {
    pub fn new(store: AtomicFileStore) -> Self {
        Self { store }
    }

    pub fn location(&self) -> &Path {
        self.store.location()
    }

    fn entries_of(&self, value: Option<Value>) -> Result<Vec<Value>, PersistenceError> {
        match value {
            None => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(PersistenceError::Corrupted {
                path: self.location().to_path_buf(),
                reason: format!("expected a JSON array of entries, found {}", kind_of(&other)),
            }),
        }
    }
}

impl LogStore for JournalFileStore {
    fn append(&self, entries: &[CausalEntry]) -> Result<(), PersistenceError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut new_values = Vec::with_capacity(entries.len());
        for entry in entries {
            new_values.push(
                serde_json::to_value(entry)
                    .map_err(|e| PersistenceError::serialization(self.location(), e))?,
            );
        }

        let committed = self.store.update(|current| {
            let mut all = self.entries_of(current)?;
            all.extend(new_values);
            Ok(Value::Array(all))
        })?;

        JournalAppended {
            path: self.location(),
            event_type: &entries[entries.len() - 1].event_type,
            entry_count: committed.as_array().map_or(0, Vec::len),
        }
        .log();
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<CausalEntry>, PersistenceError> {
        self.entries_of(self.store.load()?)?
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| PersistenceError::serialization(self.location(), e))
            })
            .collect()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CausalId, CausalKind};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn entry(secs: i64, event_type: &str) -> CausalEntry {
        CausalEntry {
            timestamp: at(secs),
            event_type: event_type.into(),
            causal_ids: vec![CausalId::new(CausalKind::WorkItem)],
            detail: json!({"t": secs}),
        }
    }

    fn journal(dir: &TempDir) -> JournalFileStore {
        JournalFileStore::new(AtomicFileStore::open(dir.path().join("journal").join("unit.json")))
    }

    #[test]
    fn empty_journal_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(journal(&dir).read_all().unwrap().is_empty());
    }

    #[test]
    fn single_appends_preserve_insertion_order() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir);
        let written: Vec<_> = (0..25).map(|i| entry(1_000 - i, &format!("e{}", i))).collect();

        for e in &written {
            journal.append(std::slice::from_ref(e)).unwrap();
        }

        assert_eq!(journal.read_all().unwrap(), written);
    }

    #[test]
    fn read_range_is_inclusive() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir);
        journal
            .append(&[entry(10, "first"), entry(20, "second"), entry(30, "third")])
            .unwrap();

        let range = journal.read_range(at(10), at(20)).unwrap();

        let names: Vec<_> = range.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn reopened_journal_keeps_entries() {
        let dir = TempDir::new().unwrap();
        journal(&dir).append(&[entry(1, "a")]).unwrap();
        journal(&dir).append(&[entry(2, "b")]).unwrap();

        assert_eq!(journal(&dir).read_all().unwrap().len(), 2);
    }

    #[test]
    fn non_array_file_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let journal = journal(&dir);
        journal.store.save(&json!({"not": "a journal"})).unwrap();

        let error = journal.read_all().unwrap_err();
        assert!(matches!(error, PersistenceError::Corrupted { .. }));
        assert!(journal.append(&[entry(1, "a")]).is_err());
    }
}
