//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/leetstats/config.toml)
//! 3. Environment variables (LEETSTATS_* prefix, plus GIST_TOKEN)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::models::SnapshotMode;

/// Environment variable prefix
const ENV_PREFIX: &str = "LEETSTATS";

/// Environment variable holding the gist access token
pub const GIST_TOKEN_VAR: &str = "GIST_TOKEN";

const DEFAULT_STATS_API_URL: &str = "https://leetcode-stats-api.herokuapp.com";
const DEFAULT_GRAPHQL_URL: &str = "https://leetcode.com/graphql/";
const DEFAULT_GIST_API_URL: &str = "https://api.github.com";
const DEFAULT_GIST_FILE: &str = "daily_stats.json";

/// Where snapshots are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON file on disk
    #[default]
    Local,
    /// A file inside a GitHub gist
    Gist,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Gist => write!(f, "gist"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "gist" => Ok(BackendKind::Gist),
            other => Err(format!("unknown backend '{}' (expected local or gist)", other)),
        }
    }
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the roster and local snapshot file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Roster file (defaults to {data_dir}/users.json)
    #[serde(default)]
    pub roster_file: Option<PathBuf>,

    /// Local snapshot file (defaults to {data_dir}/daily_stats.json)
    #[serde(default)]
    pub stats_file: Option<PathBuf>,

    /// Snapshot backend
    #[serde(default)]
    pub backend: BackendKind,

    /// What each snapshot entry records
    #[serde(default)]
    pub mode: SnapshotMode,

    /// Base URL of the per-user stats endpoint
    #[serde(default = "default_stats_api_url")]
    pub stats_api_url: String,

    /// GraphQL endpoint serving submission calendars
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// GitHub API base URL
    #[serde(default = "default_gist_api_url")]
    pub gist_api_url: String,

    /// Gist holding the snapshot document
    #[serde(default)]
    pub gist_id: Option<String>,

    /// File name inside the gist
    #[serde(default = "default_gist_file")]
    pub gist_file: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause after each user
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Write fetched totals back into the roster file
    #[serde(default)]
    pub update_roster: bool,

    /// Gist access token, only ever read from the environment
    #[serde(skip)]
    pub gist_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("roster_file", &self.roster_file)
            .field("stats_file", &self.stats_file)
            .field("backend", &self.backend)
            .field("mode", &self.mode)
            .field("stats_api_url", &self.stats_api_url)
            .field("graphql_url", &self.graphql_url)
            .field("gist_api_url", &self.gist_api_url)
            .field("gist_id", &self.gist_id)
            .field("gist_file", &self.gist_file)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("update_roster", &self.update_roster)
            .field("gist_token", &self.gist_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            roster_file: None,
            stats_file: None,
            backend: BackendKind::default(),
            mode: SnapshotMode::default(),
            stats_api_url: default_stats_api_url(),
            graphql_url: default_graphql_url(),
            gist_api_url: default_gist_api_url(),
            gist_id: None,
            gist_file: default_gist_file(),
            request_timeout_secs: default_request_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            update_roster: false,
            gist_token: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Some(val) = env_var("ROSTER_FILE") {
            self.roster_file = non_empty(val).map(PathBuf::from);
        }

        if let Some(val) = env_var("STATS_FILE") {
            self.stats_file = non_empty(val).map(PathBuf::from);
        }

        if let Some(val) = env_var("BACKEND") {
            self.backend = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid LEETSTATS_BACKEND")?;
        }

        if let Some(val) = env_var("MODE") {
            self.mode = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid LEETSTATS_MODE")?;
        }

        if let Some(val) = env_var("STATS_API_URL") {
            self.stats_api_url = val;
        }

        if let Some(val) = env_var("GRAPHQL_URL") {
            self.graphql_url = val;
        }

        if let Some(val) = env_var("GIST_API_URL") {
            self.gist_api_url = val;
        }

        if let Some(val) = env_var("GIST_ID") {
            self.gist_id = non_empty(val);
        }

        if let Some(val) = env_var("GIST_FILE") {
            self.gist_file = val;
        }

        if let Some(val) = env_var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = val
                .parse()
                .context("Invalid LEETSTATS_REQUEST_TIMEOUT_SECS")?;
        }

        if let Some(val) = env_var("REQUEST_DELAY_MS") {
            self.request_delay_ms = val
                .parse()
                .context("Invalid LEETSTATS_REQUEST_DELAY_MS")?;
        }

        if let Some(val) = env_var("UPDATE_ROSTER") {
            self.update_roster = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var(GIST_TOKEN_VAR) {
            self.gist_token = non_empty(val);
        }

        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LEETSTATS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leetstats")
            .join("config.toml")
    }

    /// Path to the roster file
    pub fn roster_path(&self) -> PathBuf {
        self.roster_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("users.json"))
    }

    /// Path to the local snapshot file
    pub fn stats_path(&self) -> PathBuf {
        self.stats_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("daily_stats.json"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// The gist token, or an error naming the variable to set
    pub fn require_gist_token(&self) -> SyncResult<&str> {
        self.gist_token
            .as_deref()
            .ok_or(SyncError::MissingToken { var: GIST_TOKEN_VAR })
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix)).ok()
}

fn non_empty(val: String) -> Option<String> {
    if val.is_empty() {
        None
    } else {
        Some(val)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_stats_api_url() -> String {
    DEFAULT_STATS_API_URL.to_string()
}

fn default_graphql_url() -> String {
    DEFAULT_GRAPHQL_URL.to_string()
}

fn default_gist_api_url() -> String {
    DEFAULT_GIST_API_URL.to_string()
}

fn default_gist_file() -> String {
    DEFAULT_GIST_FILE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_request_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "LEETSTATS_DATA_DIR",
        "LEETSTATS_ROSTER_FILE",
        "LEETSTATS_STATS_FILE",
        "LEETSTATS_BACKEND",
        "LEETSTATS_MODE",
        "LEETSTATS_STATS_API_URL",
        "LEETSTATS_GRAPHQL_URL",
        "LEETSTATS_GIST_API_URL",
        "LEETSTATS_GIST_ID",
        "LEETSTATS_GIST_FILE",
        "LEETSTATS_REQUEST_TIMEOUT_SECS",
        "LEETSTATS_REQUEST_DELAY_MS",
        "LEETSTATS_UPDATE_ROSTER",
        "GIST_TOKEN",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.mode, SnapshotMode::Total);
        assert_eq!(config.gist_file, "daily_stats.json");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert!(!config.update_roster);
        assert!(config.gist_token.is_none());
    }

    #[test]
    fn test_file_paths() {
        let mut config = Config::default();
        assert!(config.roster_path().ends_with("data/users.json"));
        assert!(config.stats_path().ends_with("data/daily_stats.json"));

        config.roster_file = Some(PathBuf::from("/etc/roster.json"));
        assert_eq!(config.roster_path(), PathBuf::from("/etc/roster.json"));
    }

    #[test]
    fn test_env_override_backend_and_mode() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LEETSTATS_BACKEND", "gist");
        env::set_var("LEETSTATS_MODE", "today");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.backend, BackendKind::Gist);
        assert_eq!(config.mode, SnapshotMode::Today);
    }

    #[test]
    fn test_env_override_rejects_bad_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LEETSTATS_BACKEND", "s3");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_update_roster() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LEETSTATS_UPDATE_ROSTER", "1");
        config.apply_env_overrides().unwrap();
        assert!(config.update_roster);

        env::set_var("LEETSTATS_UPDATE_ROSTER", "false");
        config.apply_env_overrides().unwrap();
        assert!(!config.update_roster);
    }

    #[test]
    fn test_gist_token_from_env() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(matches!(
            config.require_gist_token(),
            Err(SyncError::MissingToken { var: "GIST_TOKEN" })
        ));

        env::set_var("GIST_TOKEN", "ghp_secret");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.require_gist_token().unwrap(), "ghp_secret");
    }

    #[test]
    fn test_token_is_never_serialized() {
        let config = Config {
            gist_token: Some("ghp_secret".to_string()),
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("ghp_secret"));
        assert!(toml_str.contains("stats_api_url"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/srv/leetstats"
            backend = "gist"
            gist_id = "2b5e58d33e6106d47671a043262cbaa9"
            request_delay_ms = 250
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/leetstats"));
        assert_eq!(config.backend, BackendKind::Gist);
        assert_eq!(
            config.gist_id.as_deref(),
            Some("2b5e58d33e6106d47671a043262cbaa9")
        );
        assert_eq!(config.request_delay(), Duration::from_millis(250));
        assert_eq!(config.stats_api_url, DEFAULT_STATS_API_URL);
    }

    #[test]
    fn test_debug_hides_gist_token() {
        let config = Config {
            gist_token: Some("ghp_secret".to_string()),
            ..Config::default()
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("ghp_secret"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.backend, BackendKind::Local);
        assert!(config.gist_id.is_none());
    }
}
