//! Total-solved fetching
//!
//! `GET {base}/{handle}` answers `{ "status": "success", "totalSolved": N }`
//! on success. Anything else means the user is skipped for this run.

use anyhow::{anyhow, bail, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

/// Body of the stats endpoint
#[derive(Debug, Deserialize)]
struct StatsResponse {
    status: Option<String>,
    #[serde(rename = "totalSolved")]
    total_solved: Option<i64>,
    message: Option<String>,
}

/// Client for the per-user stats endpoint
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
}

impl StatsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch a user's total solved count
    ///
    /// Returns `None` on failure (graceful degradation).
    pub async fn fetch_total_solved(&self, handle: &str) -> Option<i64> {
        match self.fetch_total_solved_inner(handle).await {
            Ok(total) => Some(total),
            Err(e) => {
                warn!("Stats fetch failed for {}: {:#}", handle, e);
                None
            }
        }
    }

    /// Inner fetch function that can fail
    async fn fetch_total_solved_inner(&self, handle: &str) -> Result<i64> {
        let url = user_url(&self.base_url, handle)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_total_solved(&body).map_err(|e| {
            if status.is_success() {
                e
            } else {
                e.context(format!("HTTP {}", status))
            }
        })
    }
}

/// `{base}/{handle}` with the handle escaped as a single path segment
fn user_url(base_url: &str, handle: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("stats URL cannot be a base: {}", base_url))?
        .pop_if_empty()
        .push(handle);
    Ok(url)
}

/// Interpret a stats endpoint body
fn parse_total_solved(body: &str) -> Result<i64> {
    let response: StatsResponse = serde_json::from_str(body)?;

    match response.status.as_deref() {
        Some("success") => response
            .total_solved
            .ok_or_else(|| anyhow!("success response without totalSolved")),
        other => bail!(
            "status {:?}: {}",
            other.unwrap_or("missing"),
            response.message.as_deref().unwrap_or("no message")
        ),
    }
}
