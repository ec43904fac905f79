//! Submission calendar fetching
//!
//! The GraphQL endpoint returns a user's submission calendar as a JSON
//! string mapping day-start epoch seconds to that day's submission count.
//! The service does not document which timezone the day boundaries use, so
//! "today" is found by probing several candidate keys.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use chrono::{FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const SECONDS_PER_DAY: i64 = 86_400;

/// The handle is passed as a variable, never spliced into the query text.
const CALENDAR_QUERY: &str = "query userProfileCalendar($username: String!) { \
    matchedUser(username: $username) { userCalendar { submissionCalendar } } }";

/// Day-start epoch seconds (as emitted by the service) -> submissions
pub type SubmissionCalendar = HashMap<String, i64>;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<CalendarData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarData {
    matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    user_calendar: Option<UserCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserCalendar {
    submission_calendar: Option<String>,
}

/// Client for the GraphQL submission calendar
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: Client,
    graphql_url: String,
}

impl CalendarClient {
    pub fn new(client: Client, graphql_url: impl Into<String>) -> Self {
        Self {
            client,
            graphql_url: graphql_url.into(),
        }
    }

    /// Fetch a user's submission calendar
    ///
    /// Returns `None` when the calendar is unavailable for any reason.
    pub async fn fetch_calendar(&self, handle: &str) -> Option<SubmissionCalendar> {
        match self.fetch_calendar_inner(handle).await {
            Ok(calendar) => Some(calendar),
            Err(e) => {
                warn!("Calendar unavailable for {}: {:#}", handle, e);
                None
            }
        }
    }

    /// Submissions made on `today`, or 0 when the calendar is unavailable
    pub async fn fetch_today_submissions(&self, handle: &str, today: NaiveDate) -> i64 {
        self.fetch_calendar(handle)
            .await
            .map(|calendar| resolve_today(&calendar, today, *Local::now().offset()))
            .unwrap_or(0)
    }

    async fn fetch_calendar_inner(&self, handle: &str) -> Result<SubmissionCalendar> {
        let payload = json!({
            "query": CALENDAR_QUERY,
            "variables": { "username": handle },
        });

        debug!("POST {} (calendar for {})", self.graphql_url, handle);
        let response = self
            .client
            .post(&self.graphql_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }

        let body = response.text().await?;
        parse_calendar_response(&body)
    }
}

/// Extract the submission calendar from a GraphQL response body
fn parse_calendar_response(body: &str) -> Result<SubmissionCalendar> {
    let response: GraphQlResponse = serde_json::from_str(body)?;

    if let Some(error) = response.errors.first() {
        bail!("GraphQL error: {}", error.message);
    }

    let encoded = response
        .data
        .and_then(|data| data.matched_user)
        .and_then(|user| user.user_calendar)
        .and_then(|calendar| calendar.submission_calendar)
        .ok_or_else(|| anyhow!("no calendar data"))?;

    Ok(serde_json::from_str(&encoded)?)
}

/// Submissions on `today` according to `calendar`
///
/// Probes, first match wins:
/// 1. today's UTC midnight epoch as a decimal key
/// 2. any key numerically equal to it (e.g. `"1700000000.0"`)
/// 3. UTC midnight minus one day
/// 4. the previous calendar day's midnight at `local_offset`
///
/// Returns 0 when nothing matches.
pub fn resolve_today(
    calendar: &SubmissionCalendar,
    today: NaiveDate,
    local_offset: FixedOffset,
) -> i64 {
    let midnight = today.and_time(NaiveTime::MIN).and_utc().timestamp();
    let previous_local_midnight = today.pred_opt().and_then(|yesterday| {
        local_offset
            .from_local_datetime(&yesterday.and_time(NaiveTime::MIN))
            .single()
            .map(|dt| dt.timestamp())
    });

    resolve_day(calendar, midnight, previous_local_midnight)
}

fn resolve_day(
    calendar: &SubmissionCalendar,
    midnight: i64,
    previous_local_midnight: Option<i64>,
) -> i64 {
    let exact = calendar.get(&midnight.to_string());
    let numeric = || {
        calendar
            .iter()
            .find(|(key, _)| key_epoch(key) == Some(midnight))
            .map(|(_, count)| count)
    };
    let day_before = || calendar.get(&(midnight - SECONDS_PER_DAY).to_string());
    let local_day_before = || previous_local_midnight.and_then(|ts| calendar.get(&ts.to_string()));

    exact
        .or_else(numeric)
        .or_else(day_before)
        .or_else(local_day_before)
        .copied()
        .unwrap_or(0)
}

/// Numeric value of a calendar key, if it is a whole number
fn key_epoch(key: &str) -> Option<i64> {
    let key = key.trim();
    key.parse::<i64>().ok().or_else(|| {
        key.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && v.is_finite())
            .map(|v| v as i64)
    })
}
