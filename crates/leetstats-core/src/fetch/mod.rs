//! Per-user fetchers
//!
//! - `stats`: cumulative solved count from the public stats endpoint
//! - `calendar`: today's submission count from the GraphQL calendar
//!
//! Neither fetcher returns an error: a failed request, an unsuccessful
//! status or a malformed body is logged and degrades to absence (or zero).

pub mod calendar;
pub mod stats;

pub use calendar::{resolve_today, CalendarClient, SubmissionCalendar};
pub use stats::StatsClient;

use std::time::Duration;

use reqwest::Client;

use crate::error::SyncResult;

/// User agent sent with every request
const USER_AGENT: &str = concat!("leetstats/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the fetchers and the gist backend
pub fn http_client(timeout: Duration) -> SyncResult<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
