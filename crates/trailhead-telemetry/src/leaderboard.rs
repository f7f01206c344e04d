//! Leaderboard fetching and response normalization.
//!
//! The collector's highscore endpoint has drifted over time: responses
//! arrive as `{items: [...]}` or a bare array, scores live under three
//! different keys and are sometimes formatted strings. Normalization
//! coerces all of it into a sorted, well-typed entry list.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::error::TelemetryError;

/// Entries shown by default.
pub const DEFAULT_LIMIT: usize = 10;

/// One normalized leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Team name.
    pub name: String,
    /// Role label.
    pub role: String,
    /// Numeric score.
    pub score: i64,
}

/// Resolve the highscore endpoint from the configured URLs.
///
/// The first non-empty candidate wins; a `/highscore` suffix is appended
/// unless the URL already ends with one. Returns `None` when nothing is
/// configured.
#[must_use]
pub fn resolve_endpoint(explicit: Option<&str>, telemetry_base: Option<&str>) -> Option<String> {
    let base = [explicit, telemetry_base]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())?;
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/highscore") {
        Some(trimmed.to_owned())
    } else {
        Some(format!("{trimmed}/highscore"))
    }
}

/// Normalize a raw leaderboard response into sorted entries.
///
/// Accepts `{items: [...]}` or a bare array; anything else yields no
/// entries. Scores are resolved from `score`, `totalScore`, or `points`
/// with numeric coercion; names and roles fall back to placeholder labels.
/// The result is sorted descending by score (stable).
#[must_use]
pub fn normalize_entries(payload: &Value) -> Vec<LeaderboardEntry> {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut entries: Vec<LeaderboardEntry> = items
        .iter()
        .map(|item| LeaderboardEntry {
            name: first_string(item, &["teamName", "team", "name"])
                .unwrap_or_else(|| "Unknown Team".to_owned()),
            role: role_label(item).unwrap_or_else(|| "Unknown Role".to_owned()),
            score: coerce_score(
                item.get("score")
                    .or_else(|| item.get("totalScore"))
                    .or_else(|| item.get("points"))
                    .unwrap_or(&Value::Null),
            ),
        })
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

/// First non-empty string among the given keys.
fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(Value::as_str)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Role label from `role.label`, falling back to `role.id`.
fn role_label(item: &Value) -> Option<String> {
    let role = item.get("role")?;
    first_string(role, &["label", "id"])
}

/// Coerce a raw score value to an integer. Numeric strings are stripped of
/// formatting junk first; anything unparseable scores zero.
#[allow(clippy::cast_possible_truncation)]
fn coerce_score(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .unwrap_or(0),
        Value::String(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
                .collect();
            cleaned.parse::<f64>().map_or(0, |float| float as i64)
        }
        _ => 0,
    }
}

/// Fetches and normalizes the leaderboard.
///
/// Each fetch invalidates prior in-flight fetches through a generation
/// counter: a response arriving after a newer fetch began is reported as
/// [`TelemetryError::Stale`] so callers never render outdated rows.
#[derive(Debug)]
pub struct LeaderboardClient {
    endpoint: Option<String>,
    client: reqwest::Client,
    generation: AtomicU64,
}

impl LeaderboardClient {
    /// Create a client. `None` disables fetching.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch the top `limit` entries.
    ///
    /// # Errors
    ///
    /// [`TelemetryError::MissingEndpoint`] when no endpoint is configured,
    /// [`TelemetryError::Http`] on transport or status failures, and
    /// [`TelemetryError::Stale`] when a newer fetch superseded this one.
    pub async fn fetch_top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, TelemetryError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(TelemetryError::MissingEndpoint)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);

        let response = self.client.get(endpoint).send().await?;
        let payload: Value = response.error_for_status()?.json().await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding stale leaderboard response");
            return Err(TelemetryError::Stale);
        }

        let mut entries = normalize_entries(&payload);
        entries.truncate(limit);
        Ok(entries)
    }

    /// Invalidate any in-flight fetch; its response will report stale.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
