//! Snapshot persistence
//!
//! Two backends hold the dated snapshot collection:
//!
//! - **Local**: a JSON file, created on first save
//! - **Gist**: one file inside a GitHub gist, token-authenticated
//!
//! Both always write the whole collection back.

pub mod gist;
pub mod local;

pub use gist::GistStore;
pub use local::LocalFileStore;

use reqwest::Client;

use crate::config::{BackendKind, Config};
use crate::error::{SyncError, SyncResult};
use crate::models::DailySnapshotStore;

/// The configured snapshot backend
#[derive(Debug, Clone)]
pub enum SnapshotStore {
    Local(LocalFileStore),
    Gist(GistStore),
}

impl SnapshotStore {
    /// Build the backend selected in `config`
    ///
    /// The gist backend needs `gist_id` and the `GIST_TOKEN` variable.
    pub fn from_config(config: &Config, client: Client) -> SyncResult<Self> {
        match config.backend {
            BackendKind::Local => Ok(SnapshotStore::Local(LocalFileStore::new(
                config.stats_path(),
            ))),
            BackendKind::Gist => {
                let gist_id = config.gist_id.as_deref().ok_or(SyncError::NotConfigured {
                    key: "gist_id",
                    backend: "gist",
                })?;
                let token = config.require_gist_token()?;
                Ok(SnapshotStore::Gist(GistStore::new(
                    client,
                    config.gist_api_url.as_str(),
                    gist_id,
                    config.gist_file.as_str(),
                    token,
                )))
            }
        }
    }

    pub async fn load(&self) -> SyncResult<DailySnapshotStore> {
        match self {
            SnapshotStore::Local(store) => store.load(),
            SnapshotStore::Gist(store) => store.load().await,
        }
    }

    pub async fn save(&self, snapshots: &DailySnapshotStore) -> SyncResult<()> {
        match self {
            SnapshotStore::Local(store) => store.save(snapshots),
            SnapshotStore::Gist(store) => store.save(snapshots).await,
        }
    }

    /// Human-readable location, for status output
    pub fn describe(&self) -> String {
        match self {
            SnapshotStore::Local(store) => store.path().display().to_string(),
            SnapshotStore::Gist(store) => format!("gist {} ({})", store.gist_id(), store.file_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_backend_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let store = SnapshotStore::from_config(&config, Client::new()).unwrap();
        assert!(matches!(store, SnapshotStore::Local(_)));
        assert!(store.describe().ends_with("daily_stats.json"));
    }

    #[test]
    fn test_gist_backend_requires_id() {
        let config = Config {
            backend: BackendKind::Gist,
            gist_token: Some("ghp_test".to_string()),
            ..Config::default()
        };

        let err = SnapshotStore::from_config(&config, Client::new()).unwrap_err();
        assert!(matches!(err, SyncError::NotConfigured { key: "gist_id", .. }));
    }

    #[test]
    fn test_gist_backend_requires_token() {
        let config = Config {
            backend: BackendKind::Gist,
            gist_id: Some("abc".to_string()),
            gist_token: None,
            ..Config::default()
        };

        let err = SnapshotStore::from_config(&config, Client::new()).unwrap_err();
        assert!(matches!(err, SyncError::MissingToken { .. }));
    }

    #[test]
    fn test_gist_backend_describe() {
        let config = Config {
            backend: BackendKind::Gist,
            gist_id: Some("abc".to_string()),
            gist_token: Some("ghp_test".to_string()),
            ..Config::default()
        };

        let store = SnapshotStore::from_config(&config, Client::new()).unwrap();
        assert_eq!(store.describe(), "gist abc (daily_stats.json)");
    }
}
