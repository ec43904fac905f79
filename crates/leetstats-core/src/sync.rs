//! Daily sync
//!
//! One run walks a fixed sequence:
//!
//! 1. load the roster (missing roster aborts)
//! 2. load the snapshot collection (backend failure aborts)
//! 3. skip if today's date is already recorded
//! 4. fetch each user in roster order, pausing after every user
//! 5. write the roster (if totals changed), then the collection
//!
//! A single user's failed fetch never aborts the run.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SyncResult;
use crate::fetch::{http_client, CalendarClient, StatsClient};
use crate::models::{date_key, DailySnapshotStore, DayEntry, SnapshotMode, UserRecord};
use crate::roster::{load_roster, save_roster};
use crate::store::SnapshotStore;

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Re-fetch and replace today's entry even if it exists
    pub force: bool,
    /// Fetch but don't write anything back
    pub dry_run: bool,
}

/// What happened to one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserResult {
    pub handle: String,
    pub display_name: String,
    /// Recorded value, `None` if the fetch failed
    pub value: Option<i64>,
}

/// Progress notifications emitted during a run
#[derive(Debug, Clone)]
pub enum SyncEvent<'a> {
    /// About to fetch a user (`index` is 1-based)
    Fetching {
        index: usize,
        total: usize,
        user: &'a UserRecord,
    },
    /// A user's fetch finished
    Fetched(&'a UserResult),
}

/// Result of a run
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Today was already recorded; nothing was written
    Skipped,
    /// Today's entry was (re)built
    Updated {
        results: Vec<UserResult>,
        persisted: bool,
    },
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub date: String,
    pub mode: SnapshotMode,
    pub outcome: SyncOutcome,
}

impl SyncReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Skipped)
    }

    pub fn results(&self) -> &[UserResult] {
        match &self.outcome {
            SyncOutcome::Skipped => &[],
            SyncOutcome::Updated { results, .. } => results.as_slice(),
        }
    }

    pub fn recorded_count(&self) -> usize {
        self.results().iter().filter(|r| r.value.is_some()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &UserResult> {
        self.results().iter().filter(|r| r.value.is_none())
    }
}

/// Overview of the stored snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStatus {
    pub location: String,
    pub date_count: usize,
    pub first_date: Option<String>,
    pub latest: Option<(String, DayEntry)>,
}

/// Runs the daily fetch-merge-persist cycle
#[derive(Debug)]
pub struct DailySync<'a> {
    config: &'a Config,
    stats: StatsClient,
    calendar: CalendarClient,
    store: SnapshotStore,
}

impl<'a> DailySync<'a> {
    /// Build the clients and backend described by `config`
    pub fn new(config: &'a Config) -> SyncResult<Self> {
        let client = http_client(config.request_timeout())?;
        let store = SnapshotStore::from_config(config, client.clone())?;

        Ok(Self {
            config,
            stats: StatsClient::new(client.clone(), config.stats_api_url.as_str()),
            calendar: CalendarClient::new(client, config.graphql_url.as_str()),
            store,
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run without progress reporting
    pub async fn run(&self, today: NaiveDate, options: SyncOptions) -> SyncResult<SyncReport> {
        self.run_with_progress(today, options, |_| {}).await
    }

    /// Run, calling `on_event` as each user is processed
    pub async fn run_with_progress<F>(
        &self,
        today: NaiveDate,
        options: SyncOptions,
        mut on_event: F,
    ) -> SyncResult<SyncReport>
    where
        F: FnMut(SyncEvent<'_>),
    {
        let date = date_key(today);
        let mode = self.config.mode;

        let mut roster = load_roster(&self.config.roster_path())?;
        let mut snapshots = self.store.load().await?;

        if snapshots.contains_date(&date) && !options.force {
            info!("Snapshot for {} already recorded, skipping", date);
            return Ok(SyncReport {
                date,
                mode,
                outcome: SyncOutcome::Skipped,
            });
        }

        info!(
            "Recording {} snapshot for {} ({} users)",
            mode,
            date,
            roster.len()
        );
        snapshots.start_day(&date);

        let total = roster.len();
        let mut results = Vec::with_capacity(total);
        let mut roster_changed = false;

        for (index, user) in roster.iter_mut().enumerate() {
            on_event(SyncEvent::Fetching {
                index: index + 1,
                total,
                user: &*user,
            });

            let value = self.fetch_user(user, today).await;
            match value {
                Some(count) => {
                    snapshots.record(&date, &user.handle, count);
                    if mode == SnapshotMode::Total
                        && self.config.update_roster
                        && user.total_solved != Some(count)
                    {
                        user.total_solved = Some(count);
                        roster_changed = true;
                    }
                }
                None => warn!("No result for {} (@{}), skipping", user.display_name, user.handle),
            }

            let result = UserResult {
                handle: user.handle.clone(),
                display_name: user.display_name.clone(),
                value,
            };
            on_event(SyncEvent::Fetched(&result));
            results.push(result);

            tokio::time::sleep(self.config.request_delay()).await;
        }

        let persisted = !options.dry_run;
        if persisted {
            self.persist(&snapshots, roster_changed.then_some(roster.as_slice()))
                .await?;
        } else {
            info!("Dry run, not writing snapshot for {}", date);
        }

        Ok(SyncReport {
            date,
            mode,
            outcome: SyncOutcome::Updated { results, persisted },
        })
    }

    /// Fetch the value recorded for one user under the configured mode
    async fn fetch_user(&self, user: &UserRecord, today: NaiveDate) -> Option<i64> {
        match self.config.mode {
            SnapshotMode::Total => self.stats.fetch_total_solved(&user.handle).await,
            SnapshotMode::Today => Some(
                self.calendar
                    .fetch_today_submissions(&user.handle, today)
                    .await,
            ),
        }
    }

    async fn persist(
        &self,
        snapshots: &DailySnapshotStore,
        roster: Option<&[UserRecord]>,
    ) -> SyncResult<()> {
        // The date key marks the day as done, so the store is written last
        if let Some(roster) = roster {
            let path = self.config.roster_path();
            save_roster(&path, roster)?;
            info!("Roster totals updated in {:?}", path);
        }

        self.store.save(snapshots).await?;
        info!("Snapshot saved to {}", self.store.describe());

        Ok(())
    }

    /// Summarize what the backend currently holds
    pub async fn status(&self) -> SyncResult<SnapshotStatus> {
        let snapshots = self.store.load().await?;
        let first_date = snapshots.dates().next().map(str::to_string);

        Ok(SnapshotStatus {
            location: self.store.describe(),
            date_count: snapshots.len(),
            first_date,
            latest: snapshots
                .latest()
                .map(|(date, entry)| (date.to_string(), entry.clone())),
        })
    }
}
