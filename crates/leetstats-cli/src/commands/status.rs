//! Status command handler

use anyhow::Result;

use leetstats_core::{Config, DailySync};

use crate::output::Output;

/// Show what the snapshot backend currently holds
pub async fn show(config: &Config, output: &Output) -> Result<()> {
    let sync = DailySync::new(config)?;
    let status = sync.status().await?;
    output.print_status(&status);
    Ok(())
}
