//! Snapshot persistence for economy aggregates
//!
//! One pretty-printed JSON document per aggregate, overwritten wholesale on
//! every save. The aggregates are small and saves are cheap, so there is no
//! incremental log; the files stay human-editable for operators. Writes go
//! through a temp file and rename so a crash cannot leave a torn snapshot.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// File-backed snapshot store rooted at a data directory.
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open the store, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }
        Ok(Self { data_dir })
    }

    /// Overwrite the snapshot named `name` with `data`.
    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let path = self.snapshot_path(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Load the snapshot named `name`.
    ///
    /// A missing file is `SnapshotNotFound`, distinct from a malformed one,
    /// so callers can default silently on first run but log corruption.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.snapshot_path(name);
        if !path.exists() {
            return Err(StorageError::SnapshotNotFound(name.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Load a snapshot, falling back to the default value.
    ///
    /// A missing file is expected (first run) and silent; anything else is
    /// logged and also falls back so the process can still start. The next
    /// save rewrites the snapshot wholesale.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.load(name) {
            Ok(value) => value,
            Err(StorageError::SnapshotNotFound(_)) => T::default(),
            Err(e) => {
                log::error!("failed to load snapshot {name}, starting empty: {e}");
                T::default()
            }
        }
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.snapshot_path(name).exists()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: u64,
        name: String,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let data = TestData {
            value: 12345,
            name: "test".to_string(),
        };

        storage.save("test", &data).unwrap();
        let loaded: TestData = storage.load("test").unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let first = TestData {
            value: 1,
            name: "one".to_string(),
        };
        let second = TestData {
            value: 2,
            name: "two".to_string(),
        };

        storage.save("test", &first).unwrap();
        storage.save("test", &second).unwrap();
        let loaded: TestData = storage.load("test").unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn test_missing_snapshot_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        assert!(!storage.has_snapshot("test"));
        let result: Result<TestData> = storage.load("test");
        assert!(matches!(result, Err(StorageError::SnapshotNotFound(_))));
    }

    #[test]
    fn test_load_or_default_on_missing() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        let loaded: TestData = storage.load_or_default("test");
        assert_eq!(loaded, TestData::default());
    }

    #[test]
    fn test_load_or_default_on_malformed() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        fs::write(dir.path().join("test.json"), "{not json").unwrap();
        let result: Result<TestData> = storage.load("test");
        assert!(matches!(result, Err(StorageError::Serialization(_))));

        let loaded: TestData = storage.load_or_default("test");
        assert_eq!(loaded, TestData::default());
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();

        storage.save("test", &TestData::default()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "tmp").unwrap_or(false))
            .collect();
        assert!(leftovers.is_empty());
    }
}
