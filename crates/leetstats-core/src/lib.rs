//! leetstats Core Library
//!
//! Records a daily snapshot of solved-problem counts for a fixed roster of
//! users on a problem-tracking service.
//!
//! # Pipeline
//!
//! Read the roster, fetch each user's count over HTTP, merge the results into
//! today's entry of a dated collection, write the collection back to a local
//! JSON file or a GitHub gist.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let sync = DailySync::new(&config)?;
//! let report = sync.run(Utc::now().date_naive(), SyncOptions::default()).await?;
//! ```
//!
//! # Modules
//!
//! - `sync`: the daily run (main entry point)
//! - `roster`: roster file loading
//! - `fetch`: stats and submission-calendar clients
//! - `store`: snapshot persistence backends
//! - `models`: roster and snapshot data structures
//! - `config`: application configuration
//! - `error`: run-fatal errors

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod roster;
pub mod store;
pub mod sync;

pub use config::{BackendKind, Config};
pub use error::{SyncError, SyncResult};
pub use models::{DailySnapshotStore, Roster, SnapshotMode, UserRecord};
pub use store::SnapshotStore;
pub use sync::{DailySync, SnapshotStatus, SyncEvent, SyncOptions, SyncOutcome, SyncReport};
