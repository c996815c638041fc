//! Key-Value Persistence
//!
//! A small object store for the demo page: one database, one store, string
//! keys. Backed by a JSON file on disk or kept in memory.
//!
//! - database `pwa-lab`, store `kv`
//! - key `lastSaved` → RFC 3339 timestamp

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────

/// Database name.
pub const DB_NAME: &str = "pwa-lab";
/// Object store name.
pub const STORE_NAME: &str = "kv";
/// Key holding the last save time.
pub const LAST_SAVED_KEY: &str = "lastSaved";

// ── Types ───────────────────────────────────────────────────

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    /// The backing file is not a valid database.
    #[error("storage format error: {0}")]
    Format(#[from] serde_json::Error),
    /// A stored value could not be parsed.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// On-disk layout: store name → key → value.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Database {
    name: String,
    #[serde(default)]
    stores: BTreeMap<String, BTreeMap<String, String>>,
}

/// A single-store key-value database.
#[derive(Debug)]
pub struct KeyValueStore {
    db: Database,
    /// None when memory-backed
    path: Option<PathBuf>,
}

// ── Implementation ──────────────────────────────────────────

impl KeyValueStore {
    /// Memory-backed store; nothing survives the process.
    pub fn in_memory() -> Self {
        Self {
            db: Self::empty(),
            path: None,
        }
    }

    /// Open (or create on first write) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::empty(),
            Err(err) => return Err(err.into()),
        };
        log::debug!("opened {} at {}", DB_NAME, path.display());
        Ok(Self {
            db,
            path: Some(path),
        })
    }

    fn empty() -> Database {
        Database {
            name: DB_NAME.to_string(),
            stores: BTreeMap::new(),
        }
    }

    /// Get an item by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.db
            .stores
            .get(STORE_NAME)
            .and_then(|store| store.get(key))
            .map(String::as_str)
    }

    /// Set an item and persist.
    pub fn put(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.db
            .stores
            .entry(STORE_NAME.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self.flush()
    }

    /// Remove an item and persist.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let removed = self
            .db
            .stores
            .get_mut(STORE_NAME)
            .and_then(|store| store.remove(key))
            .is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn flush(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&self.db)?)?;
        }
        Ok(())
    }

    /// Record `now` under `lastSaved`; returns the stored string.
    pub fn save_timestamp(&mut self, now: DateTime<Utc>) -> Result<String> {
        let ts = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        self.put(LAST_SAVED_KEY, ts.clone())?;
        Ok(ts)
    }

    /// The last saved time, if any.
    pub fn last_saved(&self) -> Result<Option<DateTime<Utc>>> {
        self.get(LAST_SAVED_KEY)
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|_| StorageError::InvalidTimestamp(raw.to_string()))
            })
            .transpose()
    }

    /// Status line for the save button.
    pub fn save_status(&mut self) -> String {
        match self.save_timestamp(Utc::now()) {
            Ok(ts) => format!("Saved: {}", ts),
            Err(err) => {
                log::warn!("save failed: {}", err);
                err.to_string()
            }
        }
    }

    /// Status line shown at startup; None when nothing was saved yet.
    pub fn load_status(&self) -> Option<String> {
        self.get(LAST_SAVED_KEY).map(|ts| format!("Last: {}", ts))
    }
}
