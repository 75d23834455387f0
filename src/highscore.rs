//! Best score persistence
//!
//! The core only sees [`ScoreStore`], a small integer key-value contract.
//! Native builds can persist to a JSON file, web builds to LocalStorage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::HIGH_SCORE_KEY;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persistent storage is unavailable")]
    Unavailable,
}

/// Integer key-value persistence
pub trait ScoreStore {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
    /// Make pending writes durable
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// Persisted best score, never negative
pub fn best_score(store: &impl ScoreStore) -> u64 {
    store.get_int(HIGH_SCORE_KEY, 0).max(0) as u64
}

/// Store `score` if it strictly beats the persisted best.
///
/// Returns true when the best score changed. A failed flush is logged; the
/// new value stays in the store either way.
pub fn record_best(store: &mut impl ScoreStore, score: u64) -> bool {
    if score <= best_score(store) {
        return false;
    }
    store.set_int(HIGH_SCORE_KEY, score.min(i64::MAX as u64) as i64);
    if let Err(err) = store.flush() {
        log::warn!("Could not persist high score {score}: {err}");
    }
    true
}

/// In-memory store; counts writes and flushes
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
    writes: usize,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl ScoreStore for MemoryStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Flat JSON object on disk, written on flush
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::info!("Loaded {} stored values from {}", values.len(), path.display());
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        Ok(())
    }
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStore {
    prefix: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    fn item_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        Self::storage()
            .and_then(|s| s.get_item(&self.item_key(key)).ok().flatten())
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(&self.item_key(key), &value.to_string());
        }
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        // LocalStorage writes are synchronous
        Self::storage().map(|_| ()).ok_or(StoreError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose flush always fails
    struct BrokenStore(MemoryStore);

    impl ScoreStore for BrokenStore {
        fn get_int(&self, key: &str, default: i64) -> i64 {
            self.0.get_int(key, default)
        }

        fn set_int(&mut self, key: &str, value: i64) {
            self.0.set_int(key, value);
        }

        fn flush(&mut self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn test_record_best_only_on_strict_improvement() {
        let mut store = MemoryStore::new();
        assert!(record_best(&mut store, 12));
        assert_eq!(best_score(&store), 12);
        assert_eq!(store.flush_count(), 1);

        assert!(!record_best(&mut store, 12));
        assert!(!record_best(&mut store, 5));
        assert_eq!(best_score(&store), 12);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn test_zero_score_never_records() {
        let mut store = MemoryStore::new();
        assert!(!record_best(&mut store, 0));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_negative_stored_value_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set_int(HIGH_SCORE_KEY, -40);
        assert_eq!(best_score(&store), 0);
    }

    #[test]
    fn test_failed_flush_keeps_value() {
        let mut store = BrokenStore(MemoryStore::new());
        assert!(record_best(&mut store, 7));
        assert_eq!(best_score(&store), 7);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "rocket_drift_scores_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_int(HIGH_SCORE_KEY, 0), 0);
        record_best(&mut store, 42);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(best_score(&reopened), 42);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let path = std::env::temp_dir().join(format!(
            "rocket_drift_garbage_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
        let _ = std::fs::remove_file(&path);
    }
}
