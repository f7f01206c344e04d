//! Notification channels and payloads emitted by the campaign state machine.
//!
//! Every mutator on the state machine emits exactly one notification (plus
//! any emissions from nested mutator calls). A [`Notification`] carries the
//! payload; its [`Channel`] is the named pub/sub channel handlers subscribe
//! to. Channel names on the wire follow a `"topic:verb"` scheme.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::{FailureReason, LogEntry, Role, StaffMember, Timeline};

/// A named pub/sub channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Channel {
    /// `state:reset`
    StateReset,
    /// `role:selected`
    RoleSelected,
    /// `team:updated`
    TeamUpdated,
    /// `budget:changed`
    BudgetChanged,
    /// `goodwill:changed`
    GoodwillChanged,
    /// `morale:changed`
    MoraleChanged,
    /// `engagement:changed`
    EngagementChanged,
    /// `pace:changed`
    PaceChanged,
    /// `timeline:updated`
    TimelineUpdated,
    /// `staff:added`
    StaffAdded,
    /// `log:updated`
    LogUpdated,
    /// `users:changed`
    UsersChanged,
    /// `campaign:failed`
    CampaignFailed,
    /// `campaign:completed`
    CampaignCompleted,
    /// `progress:advanced`
    ProgressAdvanced,
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::StateReset => "state:reset",
            Self::RoleSelected => "role:selected",
            Self::TeamUpdated => "team:updated",
            Self::BudgetChanged => "budget:changed",
            Self::GoodwillChanged => "goodwill:changed",
            Self::MoraleChanged => "morale:changed",
            Self::EngagementChanged => "engagement:changed",
            Self::PaceChanged => "pace:changed",
            Self::TimelineUpdated => "timeline:updated",
            Self::StaffAdded => "staff:added",
            Self::LogUpdated => "log:updated",
            Self::UsersChanged => "users:changed",
            Self::CampaignFailed => "campaign:failed",
            Self::CampaignCompleted => "campaign:completed",
            Self::ProgressAdvanced => "progress:advanced",
        };
        write!(f, "{name}")
    }
}

/// A notification payload delivered to subscribed handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum Notification {
    /// The campaign state was reinitialized to defaults.
    StateReset,
    /// A role was selected from the catalog.
    RoleSelected {
        /// The role now recorded in state.
        role: Role,
    },
    /// The team name or teammate list changed.
    TeamUpdated {
        /// New team name, when the name changed.
        team_name: Option<String>,
        /// New teammate list, when the list changed.
        teammates: Option<Vec<String>>,
    },
    /// The budget changed.
    BudgetChanged {
        /// New budget value.
        budget: u32,
    },
    /// Goodwill changed.
    GoodwillChanged {
        /// New goodwill value.
        goodwill: u32,
    },
    /// Morale changed.
    MoraleChanged {
        /// New morale value.
        morale: u32,
    },
    /// The engagement level changed.
    EngagementChanged {
        /// New engagement label.
        engagement: String,
    },
    /// The pace changed.
    PaceChanged {
        /// New pace label.
        pace: String,
    },
    /// The campaign timeline was updated outside turn advancement.
    TimelineUpdated {
        /// The timeline after the update.
        timeline: Timeline,
    },
    /// A staff member was recruited.
    StaffAdded {
        /// The full staff roster after the addition.
        staff: Vec<StaffMember>,
    },
    /// A travel log entry was recorded.
    LogUpdated {
        /// The entry that was prepended.
        entry: LogEntry,
    },
    /// The secondary growth counter advanced.
    UsersChanged {
        /// User count before the advance.
        from: u64,
        /// User count after the advance.
        to: u64,
        /// Timeline before the advance.
        timeline_from: Timeline,
        /// Derived timeline after the advance.
        timeline_to: Timeline,
    },
    /// A failure condition ended the campaign.
    CampaignFailed {
        /// The failure reason (first match in priority order).
        failure: FailureReason,
    },
    /// All campuses were reached.
    CampaignCompleted {
        /// The timeline at completion.
        timeline: Timeline,
    },
    /// A turn completed without ending the campaign.
    ProgressAdvanced {
        /// Campuses reached after the turn.
        campuses_reached: u32,
        /// The timeline after the turn.
        timeline: Timeline,
    },
}

impl Notification {
    /// Return the channel this notification is delivered on.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::StateReset => Channel::StateReset,
            Self::RoleSelected { .. } => Channel::RoleSelected,
            Self::TeamUpdated { .. } => Channel::TeamUpdated,
            Self::BudgetChanged { .. } => Channel::BudgetChanged,
            Self::GoodwillChanged { .. } => Channel::GoodwillChanged,
            Self::MoraleChanged { .. } => Channel::MoraleChanged,
            Self::EngagementChanged { .. } => Channel::EngagementChanged,
            Self::PaceChanged { .. } => Channel::PaceChanged,
            Self::TimelineUpdated { .. } => Channel::TimelineUpdated,
            Self::StaffAdded { .. } => Channel::StaffAdded,
            Self::LogUpdated { .. } => Channel::LogUpdated,
            Self::UsersChanged { .. } => Channel::UsersChanged,
            Self::CampaignFailed { .. } => Channel::CampaignFailed,
            Self::CampaignCompleted { .. } => Channel::CampaignCompleted,
            Self::ProgressAdvanced { .. } => Channel::ProgressAdvanced,
        }
    }
}
