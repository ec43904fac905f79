//! Local snapshot file
//!
//! Reads `daily_stats.json` if present and starts empty otherwise, so the
//! first run needs no setup. Saves are full overwrites done atomically
//! (write to temp file, then rename).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::models::DailySnapshotStore;

/// Snapshot collection kept in a JSON file
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot collection, or an empty one if the file is absent
    pub fn load(&self) -> SyncResult<DailySnapshotStore> {
        if !self.path.exists() {
            debug!("No snapshot file at {:?}, starting empty", self.path);
            return Ok(DailySnapshotStore::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SyncError::io(e, &self.path))?;

        DailySnapshotStore::from_json(&content).map_err(|e| SyncError::MalformedBackendResponse {
            details: format!("{}: {}", self.path.display(), e),
        })
    }

    /// Overwrite the file with the full collection
    pub fn save(&self, store: &DailySnapshotStore) -> SyncResult<()> {
        let json = store.to_pretty_json()?;
        atomic_write(&self.path, json.as_bytes())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(e, parent))?;
        }
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path).map_err(|e| SyncError::io(e, &temp_path))?;
    file.write_all(data)
        .map_err(|e| SyncError::io(e, &temp_path))?;
    file.sync_all().map_err(|e| SyncError::io(e, &temp_path))?;

    fs::rename(&temp_path, path).map_err(|e| SyncError::io(e, path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path().join("daily_stats.json"));

        let snapshots = store.load().unwrap();
        assert!(snapshots.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp_dir.path().join("daily_stats.json"));

        let mut snapshots = DailySnapshotStore::new();
        snapshots.record("2024-01-01", "alice", 10);
        snapshots.record("2024-01-01", "bob", 7);
        store.save(&snapshots).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshots);
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("daily_stats.json");
        let original = r#"{"2024-01-02": {"bob": 3, "alice": 11}, "2024-01-01": {"alice": 10}}"#;
        fs::write(&path, original).unwrap();

        let store = LocalFileStore::new(&path);
        store.save(&store.load().unwrap()).unwrap();

        let before: serde_json::Value = serde_json::from_str(original).unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("daily_stats.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = LocalFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SyncError::MalformedBackendResponse { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.json");

        atomic_write(&nested_path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "{}");
        assert!(!nested_path.with_extension("tmp").exists());
    }
}
