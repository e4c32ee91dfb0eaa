// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Crash-safe single-object file store.
//!
//! A save writes the complete serialized object to a hidden temporary sibling
//! (`.<file>.tmp`), forces it to durable storage, renames it over the
//! canonical file and finally syncs the parent directory so the rename itself
//! is durable. A crash can therefore lose at most the in-flight write and
//! never corrupts the previously committed object.
//!
//! `load` first looks for a leftover temporary sibling. One that parses was
//! fully flushed before the crash and is promoted by finishing the rename.
//! One that does not parse is a torn write from before its flush and is
//! removed; the committed object stays authoritative.
//!
//! All writers of one logical file share a single lock, so two saves never
//! race on the same temporary file.

use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::PersistenceError;
use crate::observability::messages::persistence::{StoreRecovered, StoreWriteFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::ObjectStore;

pub struct AtomicFileStore {
    path: PathBuf,
    temp_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl AtomicFileStore {
    /// A store with its own private writer lock.
    ///
    /// Use [`PersistorFactory`](crate::persistence::PersistorFactory) when more
    /// than one store may point at the same file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_lock(path, Arc::new(Mutex::new(())))
    }

    pub(crate) fn with_lock(path: impl Into<PathBuf>, lock: Arc<Mutex<()>>) -> Self {
        let path = path.into();
        let temp_path = temp_sibling(&path);
        Self {
            path,
            temp_path,
            lock,
        }
    }

    /// Location of the transient write-ahead sibling
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load-modify-save under the writer lock.
    ///
    /// `f` receives the committed value (or `None`) and returns the value to
    /// commit. If `f` or the write fails, the committed value is unchanged.
    pub fn update<F>(&self, f: F) -> Result<Value, PersistenceError>
    where
        F: FnOnce(Option<Value>) -> Result<Value, PersistenceError>,
    {
        let _guard = self.guard();
        let current = self.read_committed()?;
        let next = f(current)?;
        self.write_atomic(&next)?;
        Ok(next)
    }

    fn read_committed(&self) -> Result<Option<Value>, PersistenceError> {
        self.recover()?;
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| PersistenceError::serialization(&self.path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(&self.path, e)),
        }
    }

    fn recover(&self) -> Result<(), PersistenceError> {
        let bytes = match fs::read(&self.temp_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(PersistenceError::io(&self.temp_path, e)),
        };

        if serde_json::from_slice::<Value>(&bytes).is_ok() {
            fs::rename(&self.temp_path, &self.path)
                .map_err(|e| PersistenceError::io(&self.path, e))?;
            sync_parent(&self.path)?;
            StoreRecovered {
                path: &self.path,
                action: "promoted",
            }
            .log();
        } else {
            fs::remove_file(&self.temp_path)
                .map_err(|e| PersistenceError::io(&self.temp_path, e))?;
            StoreRecovered {
                path: &self.path,
                action: "discarded as torn",
            }
            .log();
        }
        Ok(())
    }

    fn write_atomic(&self, value: &Value) -> Result<(), PersistenceError> {
        let result = self.try_write(value);
        if let Err(error) = &result {
            // A partial temp file must not be promoted by the next load.
            let _ = fs::remove_file(&self.temp_path);
            StoreWriteFailed {
                path: &self.path,
                error,
            }
            .log();
        }
        result
    }

    fn try_write(&self, value: &Value) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| PersistenceError::serialization(&self.path, e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let mut file =
            File::create(&self.temp_path).map_err(|e| PersistenceError::io(&self.temp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| PersistenceError::io(&self.temp_path, e))?;
        file.sync_all()
            .map_err(|e| PersistenceError::io(&self.temp_path, e))?;
        drop(file);

        fs::rename(&self.temp_path, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        sync_parent(&self.path)
    }
}

impl ObjectStore for AtomicFileStore {
    fn load(&self) -> Result<Option<Value>, PersistenceError> {
        let _guard = self.guard();
        self.read_committed()
    }

    fn save(&self, value: &Value) -> Result<(), PersistenceError> {
        let _guard = self.guard();
        self.write_atomic(value)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", file_name))
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<(), PersistenceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| PersistenceError::io(parent, e)),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<(), PersistenceError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ObjectStoreExt;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AtomicFileStore {
        AtomicFileStore::open(dir.path().join("state").join("worker.json"))
    }

    #[test]
    fn load_before_any_save_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().unwrap(), None);
    }

    #[test]
    fn save_then_load_round_trips_nested_and_empty_values() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let value = json!({
            "counter": 5,
            "nested": {"levels": [1, {"deep": true}], "empty_list": [], "empty_map": {}},
            "nothing": null,
            "text": ""
        });

        store.save(&value).unwrap();

        assert_eq!(store.load().unwrap(), Some(value));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn typed_helpers_round_trip() {
        #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
        struct Ledger {
            open: Vec<String>,
            total: i64,
        }

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save_as(&Ledger::default()).unwrap();
        assert_eq!(store.load_as::<Ledger>().unwrap(), Some(Ledger::default()));
    }

    #[test]
    fn crash_before_rename_is_completed_on_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&json!({"counter": 4})).unwrap();

        // Durably written temp sibling, process killed before the rename.
        let mut file = File::create(store.temp_path()).unwrap();
        file.write_all(br#"{"counter":5}"#).unwrap();
        file.sync_all().unwrap();
        drop(file);

        let restarted = AtomicFileStore::open(store.location().to_path_buf());
        assert_eq!(restarted.load().unwrap(), Some(json!({"counter": 5})));
        assert!(!restarted.temp_path().exists());
    }

    #[test]
    fn crash_before_first_commit_is_completed_on_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.location().parent().unwrap()).unwrap();
        fs::write(store.temp_path(), br#"{"counter":1}"#).unwrap();

        assert_eq!(store.load().unwrap(), Some(json!({"counter": 1})));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn torn_temp_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&json!({"counter": 4})).unwrap();
        fs::write(store.temp_path(), br#"{"counter":"#).unwrap();

        assert_eq!(store.load().unwrap(), Some(json!({"counter": 4})));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn failed_update_leaves_committed_value() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&json!({"counter": 1})).unwrap();

        let result = store.update(|_| {
            Err(PersistenceError::Corrupted {
                path: PathBuf::from("x"),
                reason: "refused".into(),
            })
        });

        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), Some(json!({"counter": 1})));
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.json");
        let lock = Arc::new(Mutex::new(()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = AtomicFileStore::with_lock(path.clone(), lock.clone());
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .update(|current| {
                                let n = current.and_then(|v| v.as_i64()).unwrap_or(0);
                                Ok(json!(n + 1))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(AtomicFileStore::open(path).load().unwrap(), Some(json!(80)));
    }
}
