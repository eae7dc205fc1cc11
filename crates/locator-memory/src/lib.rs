//! Durable learned-locator store
//!
//! Maps a [`LogicalKey`] to the last locator that successfully resolved
//! it. Records live in an in-memory map mirrored to a human-readable
//! JSON file: the file is read lazily on first access and rewritten
//! atomically (temp file + rename) on every successful write, so a
//! crash never leaves a half-written store behind. A missing or corrupt
//! file is treated as an empty store, logged, never fatal. Deleting the
//! file resets all learned state.
//!
//! Concurrent writes for the same key are last-write-wins; the store is
//! an advisory cache, not a ledger - a wrong record is corrected by the
//! next fresh resolution.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use healbrowser_core_types::{Locator, LogicalKey};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One learned locator. Exactly one record exists per logical key;
/// every successful resolution overwrites it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub locator: Locator,
    pub last_success: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            last_success: Utc::now(),
        }
    }
}

/// Memory store error enumeration
///
/// Persistence failures are warnings by contract: the in-memory record
/// has already been updated when the error is returned.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory store io failed: {0}")]
    Io(#[from] io::Error),

    #[error("memory store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key→locator store with optional durable backing
#[derive(Default)]
pub struct LocatorMemory {
    records: DashMap<LogicalKey, MemoryRecord>,
    storage_path: Option<PathBuf>,
    loaded: OnceCell<()>,
}

/// Shared store reference injected into the engine
pub type SharedLocatorMemory = Arc<LocatorMemory>;

impl LocatorMemory {
    /// Store with no durable backing; everything is lost at process exit
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store mirrored to `path`. The file is not read until the first
    /// lookup or write.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        Self {
            records: DashMap::new(),
            storage_path: Some(path.into()),
            loaded: OnceCell::new(),
        }
    }

    pub fn storage_path(&self) -> Option<&PathBuf> {
        self.storage_path.as_ref()
    }

    /// Last-known locator for the key, if any
    pub fn lookup(&self, key: &LogicalKey) -> Option<Locator> {
        self.ensure_loaded();
        let locator = self.records.get(key).map(|record| record.locator.clone());
        match &locator {
            Some(locator) => debug!(%key, %locator, "memory hit"),
            None => debug!(%key, "memory miss"),
        }
        locator
    }

    /// Upsert the record and flush the store. The in-memory record is
    /// updated even when the flush fails, so the current process still
    /// benefits from the learned locator.
    pub fn remember(&self, key: &LogicalKey, locator: Locator) -> Result<(), MemoryError> {
        self.ensure_loaded();
        info!(%key, %locator, "learned locator");
        self.records
            .insert(key.clone(), MemoryRecord::new(locator));
        self.flush()
    }

    /// Drop every record and the durable file. External operation; the
    /// engine never calls this on its own.
    pub fn reset(&self) -> Result<(), MemoryError> {
        self.ensure_loaded();
        self.records.clear();
        if let Some(path) = &self.storage_path {
            match fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "memory store reset"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// All records, sorted by key, for inspection/CLI listing
    pub fn snapshot(&self) -> Vec<(LogicalKey, MemoryRecord)> {
        self.ensure_loaded();
        let mut records: Vec<_> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        records.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        records
    }

    pub fn len(&self) -> usize {
        self.ensure_loaded();
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First-use load of the durable file. Corrupt content is treated
    /// as an empty store so a damaged cache can never block resolution.
    fn ensure_loaded(&self) {
        self.loaded.get_or_init(|| {
            let Some(path) = &self.storage_path else {
                return;
            };
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "memory store unreadable, starting empty");
                    return;
                }
            };
            if bytes.is_empty() {
                return;
            }
            match serde_json::from_slice::<BTreeMap<String, MemoryRecord>>(&bytes) {
                Ok(entries) => {
                    for (key, record) in entries {
                        self.records.insert(LogicalKey::new(key), record);
                    }
                    debug!(path = %path.display(), count = self.records.len(), "memory store loaded");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "memory store corrupt, starting empty");
                }
            }
        });
    }

    /// Atomically rewrite the durable file: serialize, write to a temp
    /// file in the same directory, then rename over the target.
    fn flush(&self) -> Result<(), MemoryError> {
        let Some(path) = &self.storage_path else {
            return Ok(());
        };
        let entries: BTreeMap<String, MemoryRecord> = self
            .records
            .iter()
            .map(|entry| (entry.key().as_str().to_string(), entry.value().clone()))
            .collect();
        let json = serde_json::to_vec_pretty(&entries)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };
        let tmp = NamedTempFile::new_in(parent)?;
        fs::write(tmp.path(), &json)?;
        tmp.persist(path).map_err(|err| MemoryError::Io(err.error))?;
        Ok(())
    }
}
