//! The telemetry wire payload.
//!
//! Field names are camelCase on the wire to match the collector's schema.
//! The payload accumulates over a session; each submission serializes the
//! whole accumulated document plus the submission counter and timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trailhead_types::Role;

/// Identifier of this client on the wire.
pub const TELEMETRY_SOURCE: &str = "trailhead";

/// Role fields carried in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRole {
    /// Catalog role id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Role description (empty when the catalog omits it).
    pub description: String,
}

impl From<&Role> for TelemetryRole {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            label: role.label.clone(),
            description: role.description.clone(),
        }
    }
}

/// One quiz answer, unique per question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    /// The answered question.
    pub question_id: String,
    /// The chosen option.
    pub choice_id: String,
    /// When the answer was recorded.
    pub answered_at: DateTime<Utc>,
    /// Scene-supplied extra fields, flattened onto the answer object.
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

/// Build metadata attached to every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    /// Crate version of the submitting client.
    pub version: String,
}

impl Default for GameMeta {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// The accumulated session payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPayload {
    /// Unique session identifier.
    pub session_id: String,
    /// Client identifier ([`TELEMETRY_SOURCE`]).
    pub source: String,
    /// When the session started collecting.
    pub collected_at: DateTime<Utc>,
    /// Selected role, once known.
    pub role: Option<TelemetryRole>,
    /// Team name, empty until entered.
    pub team_name: String,
    /// Teammate names, at most four.
    pub team_members: Vec<String>,
    /// Quiz answers, unique per question id.
    pub quiz_answers: Vec<QuizAnswer>,
    /// Build metadata.
    pub game_meta: GameMeta,
}

impl TelemetryPayload {
    /// Start a fresh session payload with a new session id.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            source: TELEMETRY_SOURCE.to_owned(),
            collected_at: Utc::now(),
            role: None,
            team_name: String::new(),
            team_members: Vec::new(),
            quiz_answers: Vec::new(),
            game_meta: GameMeta::default(),
        }
    }
}

/// The document actually POSTed: the payload plus per-submission fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody<'a> {
    /// The accumulated session payload, flattened into the document root.
    #[serde(flatten)]
    pub payload: &'a TelemetryPayload,
    /// The count this submission would bring the session to on success.
    pub submission_count: u32,
    /// When this submission was sent.
    pub submitted_at: DateTime<Utc>,
}
