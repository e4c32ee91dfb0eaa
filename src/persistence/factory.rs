// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::PersistenceError;
use crate::persistence::{AtomicFileStore, JournalFileStore};

/// Hands out persistors rooted at one data directory.
///
/// Owns one writer lock per canonical file path: every store it creates for
/// the same logical file shares that lock, so concurrent saves and appends
/// are serialized instead of racing on the temporary sibling.
///
/// Layout:
/// * `<root>/state/<operator>/<worker>.json` - one atomic store per stateful worker
/// * `<root>/journal/<unit>.json` - one journal per unit of work
pub struct PersistorFactory {
    root: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PersistorFactory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_store(&self, operator_id: &str, worker_id: &str) -> Result<AtomicFileStore, PersistenceError> {
        let dir = self.root.join("state").join(operator_id);
        self.store_at(&dir, &format!("{}.json", worker_id))
    }

    pub fn journal(&self, unit_id: &str) -> Result<JournalFileStore, PersistenceError> {
        let dir = self.root.join("journal");
        Ok(JournalFileStore::new(
            self.store_at(&dir, &format!("{}.json", unit_id))?,
        ))
    }

    fn store_at(&self, dir: &Path, file_name: &str) -> Result<AtomicFileStore, PersistenceError> {
        fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;
        let canonical = fs::canonicalize(dir)
            .map_err(|e| PersistenceError::io(dir, e))?
            .join(file_name);

        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(canonical.clone()).or_default())
        };
        Ok(AtomicFileStore::with_lock(canonical, lock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::CausalEntry;
    use crate::traits::{LogStore, ObjectStore};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn lays_out_state_and_journal_files() {
        let dir = TempDir::new().unwrap();
        let factory = PersistorFactory::new(dir.path());

        let state = factory.state_store("ledger", "running_total").unwrap();
        state.save(&json!({"total": 1})).unwrap();
        let journal = factory.journal("btc_usd").unwrap();
        journal
            .append(&[CausalEntry::new("fill", vec![], json!(null))])
            .unwrap();

        assert!(dir.path().join("state/ledger/running_total.json").exists());
        assert!(dir.path().join("journal/btc_usd.json").exists());
    }

    #[test]
    fn same_file_shares_one_lock() {
        let dir = TempDir::new().unwrap();
        let factory = PersistorFactory::new(dir.path());

        factory.state_store("ops", "w").unwrap();
        factory.state_store("ops", "w").unwrap();
        factory.state_store("ops", "other").unwrap();

        let locks = factory.locks.lock().unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn concurrent_appends_through_separate_handles_lose_nothing() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(PersistorFactory::new(dir.path()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let journal = factory.journal("unit").unwrap();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        journal
                            .append(&[CausalEntry::new(format!("t{}-{}", i, j), vec![], json!(null))])
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(factory.journal("unit").unwrap().read_all().unwrap().len(), 40);
    }
}
