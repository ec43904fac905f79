//! Data models for leetstats
//!
//! Defines the roster entries and the dated snapshot collection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tracked user from the roster file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Username on the problem-tracking service
    #[serde(rename = "leetcode_username")]
    pub handle: String,
    /// Human label
    pub display_name: String,
    /// Last known cumulative solved count
    #[serde(
        rename = "totalSolved",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_solved: Option<i64>,
    /// Fields we don't interpret, kept so a write-back doesn't drop them
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserRecord {
    pub fn new(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            display_name: display_name.into(),
            total_solved: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Ordered list of tracked users
pub type Roster = Vec<UserRecord>;

/// What a snapshot entry counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Cumulative solved count from the stats endpoint
    #[default]
    Total,
    /// Submissions made today, from the submission calendar
    Today,
}

impl fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotMode::Total => write!(f, "total"),
            SnapshotMode::Today => write!(f, "today"),
        }
    }
}

impl FromStr for SnapshotMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(SnapshotMode::Total),
            "today" => Ok(SnapshotMode::Today),
            other => Err(format!("unknown mode '{}' (expected total or today)", other)),
        }
    }
}

/// Counts recorded for a single day, keyed by handle
pub type DayEntry = BTreeMap<String, i64>;

/// Dated snapshot collection: `"YYYY-MM-DD"` -> handle -> count
///
/// Once a date key exists the day counts as processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySnapshotStore {
    days: BTreeMap<String, DayEntry>,
}

impl DailySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot document
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serialize with two-space indentation
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn contains_date(&self, date: &str) -> bool {
        self.days.contains_key(date)
    }

    pub fn day(&self, date: &str) -> Option<&DayEntry> {
        self.days.get(date)
    }

    /// Replace the entry for `date` with an empty one
    pub fn start_day(&mut self, date: &str) {
        self.days.insert(date.to_string(), DayEntry::new());
    }

    /// Record a count for a handle, creating the day if needed
    pub fn record(&mut self, date: &str, handle: &str, count: i64) {
        self.days
            .entry(date.to_string())
            .or_default()
            .insert(handle.to_string(), count);
    }

    /// Dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    /// Most recent date and its entry
    pub fn latest(&self) -> Option<(&str, &DayEntry)> {
        self.days
            .iter()
            .next_back()
            .map(|(date, entry)| (date.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Format a date as a snapshot key
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_field_names() {
        let json = r#"{"leetcode_username":"alice","display_name":"Alice","totalSolved":12}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();

        assert_eq!(user.handle, "alice");
        assert_eq!(user.display_name, "Alice");
        assert_eq!(user.total_solved, Some(12));
    }

    #[test]
    fn test_user_record_without_total() {
        let user = UserRecord::new("bob", "Bob");
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("\"leetcode_username\":\"bob\""));
        assert!(!json.contains("totalSolved"));
    }

    #[test]
    fn test_user_record_keeps_unknown_fields() {
        let json = r#"{"leetcode_username":"carol","display_name":"Carol","team":"red"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.extra.get("team"), Some(&serde_json::json!("red")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["team"], "red");
    }

    #[test]
    fn test_snapshot_mode_parse() {
        assert_eq!("total".parse::<SnapshotMode>(), Ok(SnapshotMode::Total));
        assert_eq!("TODAY".parse::<SnapshotMode>(), Ok(SnapshotMode::Today));
        assert!("weekly".parse::<SnapshotMode>().is_err());
        assert_eq!(SnapshotMode::default().to_string(), "total");
    }

    #[test]
    fn test_store_record_and_latest() {
        let mut store = DailySnapshotStore::new();
        assert!(store.is_empty());
        assert!(store.latest().is_none());

        store.record("2024-01-02", "alice", 11);
        store.record("2024-01-01", "alice", 10);
        store.record("2024-01-02", "bob", 3);

        assert_eq!(store.len(), 2);
        assert!(store.contains_date("2024-01-01"));
        assert_eq!(store.dates().collect::<Vec<_>>(), ["2024-01-01", "2024-01-02"]);

        let (date, entry) = store.latest().unwrap();
        assert_eq!(date, "2024-01-02");
        assert_eq!(entry.get("bob"), Some(&3));
    }

    #[test]
    fn test_start_day_replaces_entry() {
        let mut store = DailySnapshotStore::new();
        store.record("2024-01-01", "alice", 10);
        store.start_day("2024-01-01");

        assert!(store.contains_date("2024-01-01"));
        assert!(store.day("2024-01-01").unwrap().is_empty());
    }

    #[test]
    fn test_store_document_shape() {
        let json = r#"{"2024-01-01":{"alice":10}}"#;
        let store = DailySnapshotStore::from_json(json).unwrap();
        assert_eq!(store.day("2024-01-01").unwrap().get("alice"), Some(&10));

        let value: serde_json::Value =
            serde_json::from_str(&store.to_pretty_json().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"2024-01-01": {"alice": 10}}));
    }

    #[test]
    fn test_date_key() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_key(date), "2024-03-07");
    }
}
