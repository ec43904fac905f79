//! Roster loading
//!
//! The roster is a JSON array of users maintained by hand. A missing roster
//! aborts the run; there is no fallback to an empty list.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::models::{Roster, UserRecord};
use crate::store::local::atomic_write;

/// Read the roster from `path`
pub fn load_roster(path: &Path) -> SyncResult<Roster> {
    if !path.exists() {
        return Err(SyncError::RosterMissing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| SyncError::io(e, path))?;
    let roster: Roster = serde_json::from_str(&content).map_err(|source| SyncError::RosterParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} users from {:?}", roster.len(), path);
    Ok(roster)
}

/// Write the roster back (used when cached totals were refreshed)
pub fn save_roster(path: &Path, roster: &[UserRecord]) -> SyncResult<()> {
    let json = serde_json::to_string_pretty(roster)?;
    atomic_write(path, json.as_bytes())
}
