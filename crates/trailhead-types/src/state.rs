//! The campaign state record and its component types.
//!
//! [`CampaignState`] is a single mutable record exclusively owned by the
//! campaign state machine in `trailhead-engine`. Snapshots handed to callers
//! are deep copies -- no internal references are ever aliased outward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The role the player selected for the campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Role {
    /// Catalog identifier of the role.
    pub id: String,
    /// Display label shown to the player.
    pub label: String,
    /// Longer description of the role (empty if the catalog omits it).
    pub description: String,
    /// Score multiplier attached to the role.
    pub multiplier: u32,
}

/// A staff member recruited during the campaign, unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StaffMember {
    /// Stable identifier used by event eligibility conditions.
    pub id: String,
    /// Display label (defaults to the id when not supplied).
    pub label: String,
}

/// The campaign calendar cursor.
///
/// Advanced by one month per turn (wrapping past December into the next
/// year), or by computed day increments for the secondary growth metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Timeline {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
    /// Calendar day of month.
    pub day: u32,
}

/// Category of a travel log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Routine progress narration.
    Info,
    /// A scripted event fired this turn.
    Event,
    /// Campaign completion narration.
    Success,
}

/// One entry in the travel log, newest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Entry category.
    pub kind: LogKind,
    /// Narration text.
    pub message: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Why the campaign failed, in strict priority order.
///
/// When multiple thresholds are crossed in the same turn, the first
/// matching reason wins -- there is no multi-reason reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The budget ran dry.
    Budget,
    /// The core team burned out.
    Morale,
    /// Stakeholders withdrew support.
    Goodwill,
    /// The deadline year elapsed.
    Time,
}

/// Lifecycle phase of a campaign.
///
/// `Failed` and `Completed` are terminal with respect to turn advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CampaignPhase {
    /// Turns may still be taken.
    Active,
    /// A failure condition was reached.
    Failed,
    /// All campuses were reached.
    Completed,
}

/// The single mutable campaign state record.
///
/// Invariants (maintained by the state machine's mutators):
/// `budget >= 0`, `goodwill >= 0`, `0 <= morale <= 100`,
/// `0 <= campuses_reached <= total_campuses`, `travel_log.len() <= 12`,
/// `teammates.len() <= 4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CampaignState {
    /// Selected role, if any.
    pub role: Option<Role>,
    /// Team name entered by the player.
    pub team_name: String,
    /// Teammate names, ordered, at most four.
    pub teammates: Vec<String>,
    /// Remaining budget (floor 0, no ceiling).
    pub budget: u32,
    /// Stakeholder goodwill (floor 0, no ceiling).
    pub goodwill: u32,
    /// Team morale, clamped to `[0, 100]`.
    pub morale: u32,
    /// Current engagement level (catalog-driven label).
    pub engagement: String,
    /// Current pace level (catalog-driven label).
    pub pace: String,
    /// Campuses reached so far.
    pub campuses_reached: u32,
    /// Mirrors `campuses_reached` for the map view.
    pub current_campus_index: u32,
    /// Campaign calendar cursor.
    pub timeline: Timeline,
    /// Recruited staff, unique by id, in recruitment order.
    pub staff: Vec<StaffMember>,
    /// Travel log, newest-first, bounded to twelve entries.
    pub travel_log: Vec<LogEntry>,
    /// Secondary growth counter (user reach).
    pub users: u64,
    /// Number of progress screen visits.
    pub progress_visits: u32,
}
