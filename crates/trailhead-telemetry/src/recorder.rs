//! Fire-and-forget telemetry recording.
//!
//! The recorder accumulates a session payload and resubmits the whole
//! document after every quiz-answer change. Submission never blocks or
//! fails the campaign: every outcome is reported as a [`SubmissionOutcome`]
//! and logged, and a missing endpoint simply skips the call (warning once).

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};
use trailhead_types::Role;

use crate::payload::{QuizAnswer, SubmissionBody, TelemetryPayload};

/// HTTP status the collector uses for immutable-field or stale-counter
/// conflicts.
const CONFLICT_STATUS: u16 = 409;

/// What happened to one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The collector accepted the document; the counter advanced.
    Accepted,
    /// The collector reported a conflict (409). Logged, counter unchanged.
    Conflict,
    /// The collector rejected the document with some other status.
    Rejected {
        /// The HTTP status code returned.
        status: u16,
    },
    /// No endpoint configured, or nothing to submit; no call was made.
    Skipped,
    /// The request failed in transport.
    TransportError,
}

/// Accumulates session telemetry and submits it to the collector.
#[derive(Debug)]
pub struct TelemetryRecorder {
    endpoint: Option<String>,
    client: reqwest::Client,
    payload: TelemetryPayload,
    submission_count: u32,
    warned_missing_endpoint: bool,
}

impl TelemetryRecorder {
    /// Create a recorder with a fresh session. `None` disables submission.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            payload: TelemetryPayload::fresh(),
            submission_count: 0,
            warned_missing_endpoint: false,
        }
    }

    /// Discard the accumulated payload and start a fresh session.
    pub fn reset_session(&mut self) {
        self.payload = TelemetryPayload::fresh();
        self.submission_count = 0;
    }

    /// Replace the submission endpoint.
    pub fn set_endpoint(&mut self, endpoint: Option<String>) {
        self.endpoint = endpoint;
    }

    /// The accumulated session payload.
    #[must_use]
    pub const fn payload(&self) -> &TelemetryPayload {
        &self.payload
    }

    /// Successful submissions this session.
    #[must_use]
    pub const fn submission_count(&self) -> u32 {
        self.submission_count
    }

    /// Record the selected role.
    pub fn set_role(&mut self, role: &Role) {
        self.payload.role = Some(role.into());
    }

    /// Record the team name.
    pub fn set_team_name(&mut self, team_name: impl Into<String>) {
        self.payload.team_name = team_name.into();
    }

    /// Record the teammate list, truncated to four members.
    pub fn set_team_members(&mut self, members: Vec<String>) {
        let mut members = members;
        members.truncate(4);
        self.payload.team_members = members;
    }

    /// Record a quiz answer and submit the updated payload.
    ///
    /// A repeated question id replaces the earlier answer in place. Empty
    /// ids are ignored and nothing is submitted.
    pub async fn record_quiz_answer(
        &mut self,
        question_id: &str,
        choice_id: &str,
        extras: BTreeMap<String, serde_json::Value>,
    ) -> SubmissionOutcome {
        if question_id.is_empty() || choice_id.is_empty() {
            return SubmissionOutcome::Skipped;
        }

        let answer = QuizAnswer {
            question_id: question_id.to_owned(),
            choice_id: choice_id.to_owned(),
            answered_at: Utc::now(),
            extras,
        };
        if let Some(existing) = self
            .payload
            .quiz_answers
            .iter_mut()
            .find(|existing| existing.question_id == question_id)
        {
            *existing = answer;
        } else {
            self.payload.quiz_answers.push(answer);
        }

        self.submit().await
    }

    /// Submit the accumulated payload to the collector.
    ///
    /// Single attempt, no retry. The submission counter advances only when
    /// the collector accepts; every other outcome is logged and reported.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        let Some(endpoint) = self.endpoint.clone() else {
            if !self.warned_missing_endpoint {
                warn!("telemetry endpoint not configured; submissions disabled");
                self.warned_missing_endpoint = true;
            }
            return SubmissionOutcome::Skipped;
        };

        let body = SubmissionBody {
            payload: &self.payload,
            submission_count: self.submission_count.saturating_add(1),
            submitted_at: Utc::now(),
        };

        let response = self.client.post(&endpoint).json(&body).send().await;
        match response {
            Ok(response) if response.status().is_success() => {
                self.submission_count = self.submission_count.saturating_add(1);
                debug!(count = self.submission_count, "telemetry submission accepted");
                SubmissionOutcome::Accepted
            }
            Ok(response) if response.status().as_u16() == CONFLICT_STATUS => {
                warn!("telemetry conflict: immutable field change or stale counter");
                SubmissionOutcome::Conflict
            }
            Ok(response) => {
                let status = response.status().as_u16();
                warn!(status, "telemetry submission rejected");
                SubmissionOutcome::Rejected { status }
            }
            Err(error) => {
                warn!(%error, "telemetry submission failed in transport");
                SubmissionOutcome::TransportError
            }
        }
    }
}
