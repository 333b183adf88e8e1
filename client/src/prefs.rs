//! Persisted "always allow location" preference. Absence means not granted.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const ALWAYS: &str = "always";

pub trait PreferenceStore {
    fn always_allow(&self) -> bool;
    /// `true` stores the flag, `false` removes it.
    fn set_always_allow(&mut self, granted: bool) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredPrefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geolocation_permission: Option<String>,
}

/// JSON file on disk. An unreadable or corrupt store degrades to
/// "not granted" rather than failing startup.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    prefs: StoredPrefs,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { path, prefs }
    }

    fn persist(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&self.prefs)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn always_allow(&self) -> bool {
        self.prefs.geolocation_permission.as_deref() == Some(ALWAYS)
    }

    fn set_always_allow(&mut self, granted: bool) -> Result<(), AppError> {
        self.prefs.geolocation_permission = granted.then(|| ALWAYS.to_string());
        self.persist()
    }
}

/// Volatile store for tests and the CLI demo.
#[derive(Debug, Default)]
pub struct MemoryStore {
    always: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted() -> Self {
        Self { always: true }
    }
}

impl PreferenceStore for MemoryStore {
    fn always_allow(&self) -> bool {
        self.always
    }

    fn set_always_allow(&mut self, granted: bool) -> Result<(), AppError> {
        self.always = granted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_means_not_granted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("prefs.json"));
        assert!(!store.always_allow());
    }

    #[test]
    fn flag_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = JsonFileStore::open(&path);
        store.set_always_allow(true).unwrap();
        assert!(store.always_allow());

        let reopened = JsonFileStore::open(&path);
        assert!(reopened.always_allow());
    }

    #[test]
    fn clearing_removes_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = JsonFileStore::open(&path);
        store.set_always_allow(true).unwrap();
        store.set_always_allow(false).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert!(!reopened.always_allow());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("always"));
    }

    #[test]
    fn corrupt_file_degrades_to_not_granted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json at all").unwrap();
        let store = JsonFileStore::open(&path);
        assert!(!store.always_allow());
    }
}
