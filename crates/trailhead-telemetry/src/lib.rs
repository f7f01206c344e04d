//! External collaborators for the Trailhead campaign: telemetry submission
//! and leaderboard fetching.
//!
//! Both collaborators are strictly one-directional: they observe campaign
//! outcomes and never feed results back into campaign state. All calls are
//! single-attempt with no retry; failures are logged and reported as
//! degraded results.

pub mod error;
pub mod leaderboard;
pub mod payload;
pub mod recorder;

pub use error::TelemetryError;
pub use leaderboard::{DEFAULT_LIMIT, LeaderboardClient, LeaderboardEntry, normalize_entries, resolve_endpoint};
pub use payload::{GameMeta, QuizAnswer, TelemetryPayload, TelemetryRole};
pub use recorder::{SubmissionOutcome, TelemetryRecorder};
