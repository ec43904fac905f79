//! Gist-backed snapshot store
//!
//! The snapshot document lives as one file inside a GitHub gist. Loading
//! reads the file's text content; saving PATCHes the whole content back.
//! There is no revision check, so a concurrent writer wins or loses silently.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::models::DailySnapshotStore;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Longest response excerpt quoted in an error
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Deserialize)]
struct GistResponse {
    files: Option<HashMap<String, GistFile>>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

/// Snapshot collection stored in a gist file
#[derive(Clone)]
pub struct GistStore {
    client: Client,
    api_url: String,
    gist_id: String,
    file_name: String,
    token: String,
}

impl fmt::Debug for GistStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GistStore")
            .field("api_url", &self.api_url)
            .field("gist_id", &self.gist_id)
            .field("file_name", &self.file_name)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GistStore {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        gist_id: impl Into<String>,
        file_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            gist_id: gist_id.into(),
            file_name: file_name.into(),
            token: token.into(),
        }
    }

    pub fn gist_id(&self) -> &str {
        &self.gist_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn gist_url(&self) -> String {
        format!("{}/gists/{}", self.api_url.trim_end_matches('/'), self.gist_id)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
    }

    /// Fetch and parse the snapshot file
    pub async fn load(&self) -> SyncResult<DailySnapshotStore> {
        let url = self.gist_url();
        debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| unavailable(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(unavailable(format!(
                "GET {} returned {}: {}",
                url,
                status,
                excerpt(&body)
            )));
        }

        let gist: GistResponse = serde_json::from_str(&body).map_err(|e| {
            unavailable(format!("unexpected gist API response ({}): {}", e, excerpt(&body)))
        })?;

        let files = gist
            .files
            .ok_or_else(|| unavailable(format!("unexpected gist API response: {}", excerpt(&body))))?;

        let file = files.get(&self.file_name).ok_or_else(|| {
            unavailable(format!(
                "gist {} has no file named '{}'",
                self.gist_id, self.file_name
            ))
        })?;

        let content = match (file.truncated, &file.raw_url, &file.content) {
            (true, Some(raw_url), _) => self.fetch_raw(raw_url).await?,
            (_, _, Some(content)) => content.clone(),
            _ => {
                return Err(SyncError::MalformedBackendResponse {
                    details: format!("gist file '{}' has no content", self.file_name),
                })
            }
        };

        DailySnapshotStore::from_json(&content).map_err(|e| SyncError::MalformedBackendResponse {
            details: format!("gist file '{}': {}", self.file_name, e),
        })
    }

    /// Full content of a file the gist API returned truncated
    async fn fetch_raw(&self, raw_url: &str) -> SyncResult<String> {
        debug!("Gist file truncated, GET {}", raw_url);

        let response = self
            .authorized(self.client.get(raw_url))
            .send()
            .await
            .map_err(|e| unavailable(format!("GET {} failed: {}", raw_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("GET {} returned {}", raw_url, status)));
        }

        Ok(response.text().await?)
    }

    /// Replace the snapshot file with the full collection
    pub async fn save(&self, store: &DailySnapshotStore) -> SyncResult<()> {
        let url = self.gist_url();
        let content = store.to_pretty_json()?;
        let mut files = serde_json::Map::new();
        files.insert(self.file_name.clone(), json!({ "content": content }));
        let payload = json!({ "files": files });

        debug!("PATCH {}", url);
        let response = self
            .authorized(self.client.patch(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| unavailable(format!("PATCH {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!(
                "PATCH {} returned {}: {}",
                url,
                status,
                excerpt(&body)
            )));
        }

        info!("Gist {} updated ({} dates)", self.gist_id, store.len());
        Ok(())
    }
}

fn unavailable(details: String) -> SyncError {
    SyncError::BackendUnavailable { details }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
