//! Sync command handler

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use leetstats_core::{Config, DailySync, SyncOptions, SyncReport, SyncResult};

use crate::output::Output;

/// Record today's snapshot
///
/// `date` overrides today's UTC date.
pub async fn sync(
    config: &Config,
    options: SyncOptions,
    date: Option<NaiveDate>,
    output: &Output,
) -> Result<()> {
    let today = date.unwrap_or_else(|| Utc::now().date_naive());

    match run(config, options, today, output).await {
        Ok(report) => {
            output.print_report(&report);
            Ok(())
        }
        Err(e) => {
            output.error(&format!("Sync failed: {}", e), e.recovery_suggestion());
            Err(e.into())
        }
    }
}

async fn run(
    config: &Config,
    options: SyncOptions,
    today: NaiveDate,
    output: &Output,
) -> SyncResult<SyncReport> {
    let daily = DailySync::new(config)?;

    output.message(&format!(
        "Syncing {} ({} mode) to {}...",
        today,
        config.mode,
        daily.store().describe()
    ));

    daily
        .run_with_progress(today, options, |event| output.progress(&event))
        .await
}
