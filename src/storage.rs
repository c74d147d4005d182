// src/storage.rs

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Collection key names. These match the persisted format of the portal
/// one-to-one, so an exported file and a stored collection look identical.
pub const QUESTIONS: &str = "questions";
pub const CANDIDATES: &str = "candidates";
pub const EXAM_RESULTS: &str = "examResults";
pub const LATEST_RESULT: &str = "examResult";
pub const ACTIVE_SESSIONS: &str = "activeExamSessions";

/// Named-collection JSON store.
///
/// Each key maps to one pretty-printed JSON file under `dir`. All writes go
/// through a process-wide mutex: the portal is a single-writer-at-a-time
/// system and read-modify-write cycles must not interleave.
#[derive(Clone)]
pub struct Storage {
    dir: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: Arc::new(dir),
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Reads a single value. A missing key is `None`; a file that exists
    /// but does not parse is an error (stored data is not validated, so a
    /// corrupt file has no recovery path).
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(self.path_for(key), raw)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), AppError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Reads a collection, treating a missing key as the empty collection.
    pub fn read_array<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        Ok(self.read(key)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> Storage {
        let dir = std::env::temp_dir().join(format!(
            "admission-portal-storage-{}-{:x}",
            std::process::id(),
            rand::random::<u64>()
        ));
        Storage::open(dir).unwrap()
    }

    #[test]
    fn missing_key_reads_as_none_and_empty_array() {
        let store = temp_store();
        let single: Option<String> = store.read("nothing").unwrap();
        assert!(single.is_none());
        let many: Vec<String> = store.read_array("nothing").unwrap();
        assert!(many.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let store = temp_store();
        store
            .write(QUESTIONS, &vec!["a".to_string(), "b".to_string()])
            .unwrap();
        let back: Vec<String> = store.read_array(QUESTIONS).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn remove_clears_the_key() {
        let store = temp_store();
        store.write(LATEST_RESULT, &42u32).unwrap();
        store.remove(LATEST_RESULT).unwrap();
        let back: Option<u32> = store.read(LATEST_RESULT).unwrap();
        assert!(back.is_none());
    }
}
