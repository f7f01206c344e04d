//! The campaign state machine and turn algorithm.
//!
//! [`CampaignEngine`] exclusively owns the single mutable [`CampaignState`]
//! record plus the catalogs, the tuning knobs, the listener bus, and the
//! injected random/clock sources. Every mutator is synchronous and emits
//! its notifications before returning; callers only ever see deep-copied
//! snapshots.

use tracing::{debug, info, warn};
use trailhead_events::{Handler, ListenerBus, SubscriptionId};
use trailhead_types::{
    CampaignPhase, CampaignState, Channel, EventCatalog, EventDefinition, FailureReason, LogEntry,
    LogKind, Notification, PromptCatalog, Role, RoleOption, StaffMember, Timeline,
};

use crate::clock::{Clock, SystemClock};
use crate::config::CampaignTuning;
use crate::eligibility::{self, EffectCallbacks, MAX_MORALE};
use crate::error::CampaignError;
use crate::rng::{RandomSource, ThreadRandomSource};
use crate::timeline;

/// Multiplier attached to every freshly selected role.
const DEFAULT_ROLE_MULTIPLIER: u32 = 1;

/// A launch timing choice applied to the campaign calendar.
///
/// Both fields are optional; an empty option is a no-op that still emits
/// `timeline:updated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchTimingOption {
    /// Month to move the calendar cursor to, 1 through 12.
    pub month: Option<u32>,
    /// Goodwill delta granted by the chosen timing.
    pub goodwill_bonus: Option<i32>,
}

/// A travel log entry draft; absent fields are defaulted by the engine.
#[derive(Debug, Clone, Default)]
pub struct NewLogEntry {
    /// Entry category (defaults to [`LogKind::Info`]).
    pub kind: Option<LogKind>,
    /// Narration text.
    pub message: String,
    /// Timestamp (defaults to the engine clock's now).
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl NewLogEntry {
    /// Draft an info entry.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: Some(LogKind::Info),
            message: message.into(),
            timestamp: None,
        }
    }

    /// Draft an event entry.
    pub fn event(message: impl Into<String>) -> Self {
        Self {
            kind: Some(LogKind::Event),
            message: message.into(),
            timestamp: None,
        }
    }

    /// Draft a success entry.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: Some(LogKind::Success),
            message: message.into(),
            timestamp: None,
        }
    }
}

/// Result of one turn of the campaign.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Snapshot of the state after the turn.
    pub state: CampaignState,
    /// The scripted event that fired this turn, if any.
    pub event: Option<EventDefinition>,
    /// Whether the campaign ended this turn (failure or completion).
    pub end_game: bool,
    /// The failure reason when the campaign ended in failure.
    pub failure: Option<FailureReason>,
}

/// Result of one advancement of the secondary growth metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsersProgress {
    /// User count before the advance.
    pub from: u64,
    /// User count after the advance.
    pub to: u64,
    /// Campaign timeline at the time of the advance.
    pub timeline_from: Timeline,
    /// Derived timeline after the advance (the campaign cursor is untouched).
    pub timeline_to: Timeline,
}

/// The campaign state machine.
///
/// Owns the state record, the catalogs, and a per-instance [`ListenerBus`].
/// Constructed via [`CampaignEngine::new`] for production sources or
/// [`CampaignEngine::with_sources`] to inject a scripted random source and
/// a pinned clock.
pub struct CampaignEngine {
    state: CampaignState,
    phase: CampaignPhase,
    bus: ListenerBus,
    prompts: PromptCatalog,
    events: EventCatalog,
    tuning: CampaignTuning,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
}

impl core::fmt::Debug for CampaignEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CampaignEngine")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("events", &self.events.events.len())
            .finish_non_exhaustive()
    }
}

impl CampaignEngine {
    /// Create an engine with production sources (thread RNG, system clock).
    #[must_use]
    pub fn new(prompts: PromptCatalog, events: EventCatalog, tuning: CampaignTuning) -> Self {
        Self::with_sources(
            prompts,
            events,
            tuning,
            Box::new(ThreadRandomSource::new()),
            Box::new(SystemClock::new()),
        )
    }

    /// Create an engine with injected random and clock sources.
    #[must_use]
    pub fn with_sources(
        prompts: PromptCatalog,
        events: EventCatalog,
        tuning: CampaignTuning,
        rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = fresh_state(&tuning);
        Self {
            state,
            phase: CampaignPhase::Active,
            bus: ListenerBus::new(),
            prompts,
            events,
            tuning,
            rng,
            clock,
        }
    }

    // --- Subscriptions ----------------------------------------------------

    /// Subscribe a handler to a channel. Handlers fire in registration order.
    pub fn on(&mut self, channel: Channel, handler: Handler) -> SubscriptionId {
        self.bus.on(channel, handler)
    }

    /// Remove a previously registered handler.
    pub fn off(&mut self, channel: Channel, id: SubscriptionId) {
        self.bus.off(channel, id);
    }

    fn emit(&self, notification: &Notification) {
        self.bus.emit(notification, &self.state);
    }

    // --- Accessors --------------------------------------------------------

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> CampaignPhase {
        self.phase
    }

    /// Deep independent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CampaignState {
        self.state.clone()
    }

    /// Number of campuses in the rollout.
    #[must_use]
    pub const fn total_campuses(&self) -> u32 {
        self.tuning.total_campuses
    }

    /// Campuses not yet reached.
    #[must_use]
    pub const fn remaining_campuses(&self) -> u32 {
        self.tuning
            .total_campuses
            .saturating_sub(self.state.campuses_reached)
    }

    /// The travel log, newest-first.
    #[must_use]
    pub fn travel_log(&self) -> &[LogEntry] {
        &self.state.travel_log
    }

    /// Current user reach.
    #[must_use]
    pub const fn users(&self) -> u64 {
        self.state.users
    }

    /// Selectable roles from the prompt catalog.
    #[must_use]
    pub fn role_options(&self) -> &[RoleOption] {
        self.prompts.role_options()
    }

    /// Look up a role option by id.
    #[must_use]
    pub fn role_by_id(&self, role_id: &str) -> Option<&RoleOption> {
        self.prompts.role_by_id(role_id)
    }

    /// The full event deck, in catalog order.
    #[must_use]
    pub fn event_deck(&self) -> &[EventDefinition] {
        &self.events.events
    }

    /// Look up an event by id.
    #[must_use]
    pub fn event_by_id(&self, event_id: &str) -> Option<&EventDefinition> {
        self.events.event_by_id(event_id)
    }

    /// The prompt catalog (scene copy, role options).
    #[must_use]
    pub const fn prompts(&self) -> &PromptCatalog {
        &self.prompts
    }

    /// Whether a staff member is on the roster.
    #[must_use]
    pub fn has_staff_member(&self, staff_id: &str) -> bool {
        self.state.staff.iter().any(|member| member.id == staff_id)
    }

    /// Ids of the recruited staff, in recruitment order.
    #[must_use]
    pub fn staff_ids(&self) -> Vec<String> {
        self.state
            .staff
            .iter()
            .map(|member| member.id.clone())
            .collect()
    }

    /// Format the campaign calendar cursor as a long-form date.
    #[must_use]
    pub fn format_timeline(&self) -> String {
        timeline::format(&self.state.timeline)
    }

    /// Narration for a failure reason.
    #[must_use]
    pub const fn describe_failure(reason: FailureReason) -> &'static str {
        match reason {
            FailureReason::Budget => "The rollout stalls after the budget runs dry.",
            FailureReason::Morale => "Your core team burns out and refuses to continue.",
            FailureReason::Goodwill => "Stakeholders withdraw support, halting the rollout.",
            FailureReason::Time => "The academic year ends before you complete the rollout.",
        }
    }

    // --- Mutators ---------------------------------------------------------

    /// Reinitialize the campaign to its starting state. Emits `state:reset`.
    pub fn reset_campaign(&mut self) {
        self.state = fresh_state(&self.tuning);
        self.phase = CampaignPhase::Active;
        info!("campaign reset");
        self.emit(&Notification::StateReset);
    }

    /// Select a role from the catalog and reset the budget.
    ///
    /// Emits `role:selected` and returns the recorded role. On an unknown
    /// id the state is left untouched and nothing is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::UnknownRole`] when the id is not in the
    /// role catalog.
    pub fn select_role(&mut self, role_id: &str) -> Result<Role, CampaignError> {
        let option = self
            .prompts
            .role_by_id(role_id)
            .ok_or_else(|| CampaignError::UnknownRole {
                role_id: role_id.to_owned(),
            })?;

        let role = Role {
            id: option.id.clone(),
            label: option.label.clone(),
            description: option.description.clone().unwrap_or_default(),
            multiplier: DEFAULT_ROLE_MULTIPLIER,
        };
        self.state.role = Some(role.clone());
        self.state.budget = self.tuning.starting_budget;

        info!(role_id, "role selected");
        self.emit(&Notification::RoleSelected { role: role.clone() });
        Ok(role)
    }

    /// Record the team name. Emits `team:updated`.
    pub fn update_team_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.state.team_name.clone_from(&name);
        self.emit(&Notification::TeamUpdated {
            team_name: Some(name),
            teammates: None,
        });
    }

    /// Record the teammate list, capped to the configured maximum.
    /// Emits `team:updated`.
    pub fn update_teammates(&mut self, names: Vec<String>) {
        let mut names = names;
        names.truncate(self.tuning.max_teammates);
        self.state.teammates.clone_from(&names);
        self.emit(&Notification::TeamUpdated {
            team_name: None,
            teammates: Some(names),
        });
    }

    /// Adjust the budget by a signed delta, floored at zero.
    /// Emits `budget:changed`.
    pub fn adjust_budget(&mut self, delta: i32) {
        self.state.budget = eligibility::floored_add(self.state.budget, delta);
        self.emit(&Notification::BudgetChanged {
            budget: self.state.budget,
        });
    }

    /// Adjust goodwill by a signed delta, floored at zero.
    /// Emits `goodwill:changed`.
    pub fn adjust_goodwill(&mut self, delta: i32) {
        self.state.goodwill = eligibility::floored_add(self.state.goodwill, delta);
        self.emit(&Notification::GoodwillChanged {
            goodwill: self.state.goodwill,
        });
    }

    /// Adjust morale by a signed delta, clamped to `[0, 100]`.
    /// Emits `morale:changed`.
    pub fn adjust_morale(&mut self, delta: i32) {
        self.state.morale = eligibility::clamped_add(self.state.morale, delta, MAX_MORALE);
        self.emit(&Notification::MoraleChanged {
            morale: self.state.morale,
        });
    }

    /// Set the engagement level label. Emits `engagement:changed`.
    pub fn set_engagement(&mut self, level: impl Into<String>) {
        let level = level.into();
        self.state.engagement.clone_from(&level);
        self.emit(&Notification::EngagementChanged { engagement: level });
    }

    /// Set the pace label. Emits `pace:changed`.
    pub fn set_pace(&mut self, level: impl Into<String>) {
        let level = level.into();
        self.state.pace.clone_from(&level);
        self.emit(&Notification::PaceChanged { pace: level });
    }

    /// Apply a launch timing choice: move the calendar cursor to the
    /// option's month and route any goodwill bonus through
    /// [`Self::adjust_goodwill`]. Emits `timeline:updated` (after the
    /// goodwill emission, when there is one).
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::InvalidTimingOption`] when the month is
    /// outside `[1, 12]`; the state is left untouched.
    pub fn set_launch_timing(&mut self, option: LaunchTimingOption) -> Result<(), CampaignError> {
        if let Some(month) = option.month {
            if !(1..=12).contains(&month) {
                return Err(CampaignError::InvalidTimingOption { month });
            }
            self.state.timeline.month = month;
        }
        if let Some(bonus) = option.goodwill_bonus.filter(|bonus| *bonus != 0) {
            self.adjust_goodwill(bonus);
        }
        self.emit(&Notification::TimelineUpdated {
            timeline: self.state.timeline,
        });
        Ok(())
    }

    /// Recruit a staff member. Idempotent on id: recruiting an existing id
    /// does nothing and emits nothing. Emits `staff:added` with the full
    /// roster otherwise. The label defaults to the id.
    pub fn register_staff_member(&mut self, staff_id: &str, label: Option<&str>) {
        if self.has_staff_member(staff_id) {
            return;
        }
        self.state.staff.push(StaffMember {
            id: staff_id.to_owned(),
            label: label.unwrap_or(staff_id).to_owned(),
        });
        debug!(staff_id, "staff member recruited");
        self.emit(&Notification::StaffAdded {
            staff: self.state.staff.clone(),
        });
    }

    /// Prepend a travel log entry, truncating the log to its cap.
    ///
    /// The draft's kind defaults to [`LogKind::Info`] and its timestamp to
    /// the engine clock's now. Emits `log:updated` and returns the recorded
    /// entry.
    pub fn add_log_entry(&mut self, draft: NewLogEntry) -> LogEntry {
        let entry = LogEntry {
            kind: draft.kind.unwrap_or(LogKind::Info),
            message: draft.message,
            timestamp: draft.timestamp.unwrap_or_else(|| self.clock.now()),
        };
        self.state.travel_log.insert(0, entry.clone());
        self.state.travel_log.truncate(self.tuning.travel_log_cap);
        self.emit(&Notification::LogUpdated {
            entry: entry.clone(),
        });
        entry
    }

    // --- Turn algorithm ---------------------------------------------------

    /// Advance the campaign by one turn.
    ///
    /// Applies the per-turn resource costs, moves to the next campus and
    /// month, rolls for a scripted event, then evaluates failure (strict
    /// priority: budget, morale, goodwill, time) and completion. Exactly one
    /// of `campaign:failed`, `campaign:completed`, or `progress:advanced`
    /// is emitted at the end of the turn, after the log emission.
    #[allow(clippy::too_many_lines)]
    pub fn advance_campaign(&mut self) -> TurnOutcome {
        if self.phase != CampaignPhase::Active {
            warn!(phase = ?self.phase, "advance_campaign called after terminal phase");
        }

        self.adjust_budget(negate(self.tuning.turn_budget_cost));
        self.adjust_morale(negate(self.tuning.turn_morale_cost));
        self.adjust_goodwill(negate(self.tuning.turn_goodwill_cost));

        self.state.campuses_reached = self
            .state
            .campuses_reached
            .saturating_add(1)
            .min(self.tuning.total_campuses);
        self.state.current_campus_index = self.state.campuses_reached;
        timeline::advance_month(&mut self.state.timeline);

        let triggered = self.roll_event();
        if let Some(event) = &triggered {
            let pending = self.apply_triggered_event(event);
            for notification in &pending {
                self.emit(notification);
            }
            debug!(event_id = %event.id, "scripted event fired");
            self.add_log_entry(NewLogEntry::event(format!(
                "{}: {}",
                event.name, event.description
            )));
        } else {
            self.add_log_entry(NewLogEntry::info(
                "You push onward to the next campus without major incident.",
            ));
        }

        let end_game = self.state.campuses_reached >= self.tuning.total_campuses;
        let failure = self.check_failure();

        if let Some(reason) = failure {
            self.phase = CampaignPhase::Failed;
            self.add_log_entry(NewLogEntry::event(Self::describe_failure(reason)));
            info!(?reason, "campaign failed");
            self.emit(&Notification::CampaignFailed { failure: reason });
            return TurnOutcome {
                state: self.snapshot(),
                event: triggered,
                end_game: true,
                failure,
            };
        }

        if end_game {
            self.phase = CampaignPhase::Completed;
            self.add_log_entry(NewLogEntry::success(
                "You have reached the final campus! The rollout is complete.",
            ));
            info!("campaign completed");
            self.emit(&Notification::CampaignCompleted {
                timeline: self.state.timeline,
            });
        } else {
            self.emit(&Notification::ProgressAdvanced {
                campuses_reached: self.state.campuses_reached,
                timeline: self.state.timeline,
            });
        }

        TurnOutcome {
            state: self.snapshot(),
            event: triggered,
            end_game,
            failure,
        }
    }

    /// Roll for a scripted event: with the configured probability and at
    /// least one eligible event, pick one uniformly.
    fn roll_event(&mut self) -> Option<EventDefinition> {
        let eligible = eligibility::filter_eligible_events(&self.events.events, &self.state);
        if eligible.is_empty() {
            return None;
        }
        if self.rng.next_f64() >= self.tuning.event_probability {
            return None;
        }
        let index = pick_index(self.rng.next_f64(), eligible.len());
        eligible.get(index).map(|event| (*event).clone())
    }

    /// Apply a triggered event's effects to the state, buffering the
    /// resource-change notifications so they can be delivered after the
    /// state assignment. Progress is clamped to the campus total.
    fn apply_triggered_event(&mut self, event: &EventDefinition) -> Vec<Notification> {
        let mut budget_note = None;
        let mut goodwill_note = None;
        let mut morale_note = None;

        let next = {
            let mut on_budget =
                |budget: u32| budget_note = Some(Notification::BudgetChanged { budget });
            let mut on_goodwill =
                |goodwill: u32| goodwill_note = Some(Notification::GoodwillChanged { goodwill });
            let mut on_morale =
                |morale: u32| morale_note = Some(Notification::MoraleChanged { morale });
            eligibility::apply_event_effects(
                event,
                &self.state,
                &mut EffectCallbacks {
                    on_budget_change: Some(&mut on_budget),
                    on_goodwill_change: Some(&mut on_goodwill),
                    on_morale_change: Some(&mut on_morale),
                },
            )
        };

        self.state = next;
        self.state.campuses_reached = self
            .state
            .campuses_reached
            .min(self.tuning.total_campuses);
        self.state.current_campus_index = self.state.campuses_reached;

        [budget_note, goodwill_note, morale_note]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Evaluate the failure conditions in strict priority order.
    ///
    /// Budget, then morale, then goodwill at zero; then the calendar past
    /// the deadline year. First match wins; `None` when none match.
    #[must_use]
    pub const fn check_failure(&self) -> Option<FailureReason> {
        if self.state.budget == 0 {
            return Some(FailureReason::Budget);
        }
        if self.state.morale == 0 {
            return Some(FailureReason::Morale);
        }
        if self.state.goodwill == 0 {
            return Some(FailureReason::Goodwill);
        }
        if self.state.timeline.year > self.tuning.deadline_year {
            return Some(FailureReason::Time);
        }
        None
    }

    /// Advance the secondary growth metric: add the configured user
    /// increment, count the visit, and compute a derived timeline advanced
    /// by the configured day increment. The campaign calendar cursor is
    /// untouched. Emits `users:changed` and returns the before/after pair.
    pub fn advance_users(&mut self) -> UsersProgress {
        let from = self.state.users;
        let timeline_from = self.state.timeline;

        self.state.users = from.saturating_add(self.tuning.users_increment);
        self.state.progress_visits = self.state.progress_visits.saturating_add(1);
        let timeline_to = timeline::add_days(timeline_from, self.tuning.progress_day_increment);

        let progress = UsersProgress {
            from,
            to: self.state.users,
            timeline_from,
            timeline_to,
        };
        self.emit(&Notification::UsersChanged {
            from: progress.from,
            to: progress.to,
            timeline_from,
            timeline_to,
        });
        progress
    }
}

/// Build the starting state record from the tuning knobs.
fn fresh_state(tuning: &CampaignTuning) -> CampaignState {
    CampaignState {
        role: None,
        team_name: String::new(),
        teammates: Vec::new(),
        budget: tuning.starting_budget,
        goodwill: tuning.starting_goodwill,
        morale: tuning.starting_morale,
        engagement: tuning.starting_engagement.clone(),
        pace: tuning.starting_pace.clone(),
        campuses_reached: 0,
        current_campus_index: 0,
        timeline: Timeline {
            year: tuning.start_year,
            month: 1,
            day: 1,
        },
        staff: Vec::new(),
        travel_log: Vec::new(),
        users: 0,
        progress_visits: 0,
    }
}

/// Negate an unsigned cost into a signed delta without wrapping.
const fn negate(value: u32) -> i32 {
    0i32.saturating_sub_unsigned(value)
}

/// Map a roll in `[0, 1)` onto an index in `[0, len)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn pick_index(roll: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let scaled = (roll.max(0.0) * len as f64).floor() as usize;
    scaled.min(len.saturating_sub(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use trailhead_types::{EventConditions, EventEffects, RoleSelectionPrompts};

    use crate::clock::FixedClock;
    use crate::rng::SequenceRandomSource;

    use super::*;

    fn sample_prompts() -> PromptCatalog {
        PromptCatalog {
            role_selection: RoleSelectionPrompts {
                options: vec![
                    RoleOption {
                        id: "coordinator".to_owned(),
                        label: "Rollout Coordinator".to_owned(),
                        description: Some("Keeps the tour on schedule.".to_owned()),
                    },
                    RoleOption {
                        id: "evangelist".to_owned(),
                        label: "Campus Evangelist".to_owned(),
                        description: None,
                    },
                ],
            },
            blocks: std::collections::BTreeMap::new(),
        }
    }

    fn sample_events() -> EventCatalog {
        EventCatalog {
            events: vec![
                EventDefinition {
                    id: "flat_tire".to_owned(),
                    name: "Flat tire".to_owned(),
                    description: "The van limps into the next town.".to_owned(),
                    conditions: EventConditions::default(),
                    effects: EventEffects {
                        budget: Some(-25),
                        morale: Some(-5),
                        ..EventEffects::default()
                    },
                },
                EventDefinition {
                    id: "press_feature".to_owned(),
                    name: "Press feature".to_owned(),
                    description: "A local paper covers the tour.".to_owned(),
                    conditions: EventConditions {
                        min_campus: Some(3),
                        ..EventConditions::default()
                    },
                    effects: EventEffects {
                        goodwill: Some(10),
                        ..EventEffects::default()
                    },
                },
            ],
        }
    }

    fn test_engine(tuning: CampaignTuning, rolls: Vec<f64>) -> CampaignEngine {
        CampaignEngine::with_sources(
            sample_prompts(),
            sample_events(),
            tuning,
            Box::new(SequenceRandomSource::new(rolls)),
            Box::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
            )),
        )
    }

    fn quiet_engine() -> CampaignEngine {
        // 0.99 never clears the 0.65 trigger threshold.
        test_engine(CampaignTuning::default(), vec![0.99])
    }

    fn record_channels(
        engine: &mut CampaignEngine,
        channels: &[Channel],
    ) -> Arc<Mutex<Vec<Channel>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for &channel in channels {
            let seen = Arc::clone(&seen);
            engine.on(
                channel,
                Box::new(move |notification, _state| {
                    seen.lock().unwrap().push(notification.channel());
                }),
            );
        }
        seen
    }

    #[test]
    fn fresh_engine_has_starting_state() {
        let engine = quiet_engine();
        let state = engine.snapshot();
        assert_eq!(state.budget, 800);
        assert_eq!(state.goodwill, 100);
        assert_eq!(state.morale, 70);
        assert_eq!(state.engagement, "filling");
        assert_eq!(state.pace, "steady");
        assert_eq!(state.campuses_reached, 0);
        assert_eq!(state.timeline, Timeline { year: 2025, month: 1, day: 1 });
        assert!(state.role.is_none());
        assert_eq!(engine.phase(), CampaignPhase::Active);
        assert_eq!(engine.remaining_campuses(), 23);
    }

    #[test]
    fn reset_restores_defaults_and_emits() {
        let mut engine = quiet_engine();
        engine.adjust_budget(-500);
        engine.update_team_name("Pilot Crew");
        let seen = record_channels(&mut engine, &[Channel::StateReset]);

        engine.reset_campaign();

        let state = engine.snapshot();
        assert_eq!(state.budget, 800);
        assert!(state.team_name.is_empty());
        assert_eq!(seen.lock().unwrap().as_slice(), &[Channel::StateReset]);
    }

    #[test]
    fn select_role_records_role_and_resets_budget() {
        let mut engine = quiet_engine();
        engine.adjust_budget(-300);

        let role = engine.select_role("coordinator").unwrap();
        assert_eq!(role.id, "coordinator");
        assert_eq!(role.multiplier, 1);
        assert_eq!(role.description, "Keeps the tour on schedule.");

        let state = engine.snapshot();
        assert_eq!(state.budget, 800);
        assert_eq!(state.role.unwrap().label, "Rollout Coordinator");
    }

    #[test]
    fn select_role_defaults_missing_description() {
        let mut engine = quiet_engine();
        let role = engine.select_role("evangelist").unwrap();
        assert!(role.description.is_empty());
    }

    #[test]
    fn unknown_role_errors_and_leaves_state_untouched() {
        let mut engine = quiet_engine();
        engine.adjust_budget(-300);
        let seen = record_channels(&mut engine, &[Channel::RoleSelected]);

        let err = engine.select_role("imposter").unwrap_err();
        assert!(matches!(err, CampaignError::UnknownRole { ref role_id } if role_id == "imposter"));

        let state = engine.snapshot();
        assert!(state.role.is_none());
        assert_eq!(state.budget, 500);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn adjust_mutators_floor_and_clamp() {
        let mut engine = quiet_engine();
        engine.adjust_budget(-900);
        engine.adjust_goodwill(-150);
        engine.adjust_morale(50);

        let state = engine.snapshot();
        assert_eq!(state.budget, 0);
        assert_eq!(state.goodwill, 0);
        assert_eq!(state.morale, 100);
    }

    #[test]
    fn teammates_are_capped() {
        let mut engine = quiet_engine();
        engine.update_teammates(vec![
            "Ada".to_owned(),
            "Grace".to_owned(),
            "Edsger".to_owned(),
            "Barbara".to_owned(),
            "Donald".to_owned(),
        ]);
        assert_eq!(engine.snapshot().teammates.len(), 4);
    }

    #[test]
    fn engagement_and_pace_labels_are_recorded_and_emitted() {
        let mut engine = quiet_engine();
        let seen = record_channels(
            &mut engine,
            &[Channel::EngagementChanged, Channel::PaceChanged],
        );

        engine.set_engagement("thriving");
        engine.set_pace("grueling");

        let state = engine.snapshot();
        assert_eq!(state.engagement, "thriving");
        assert_eq!(state.pace, "grueling");
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Channel::EngagementChanged, Channel::PaceChanged]
        );
    }

    #[test]
    fn launch_timing_rejects_out_of_range_month() {
        let mut engine = quiet_engine();
        let seen = record_channels(&mut engine, &[Channel::TimelineUpdated]);

        let err = engine
            .set_launch_timing(LaunchTimingOption {
                month: Some(13),
                goodwill_bonus: Some(5),
            })
            .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidTimingOption { month: 13 }));

        let state = engine.snapshot();
        assert_eq!(state.timeline.month, 1);
        assert_eq!(state.goodwill, 100);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn launch_timing_applies_month_and_routes_bonus() {
        let mut engine = quiet_engine();
        let seen = record_channels(
            &mut engine,
            &[Channel::GoodwillChanged, Channel::TimelineUpdated],
        );

        engine
            .set_launch_timing(LaunchTimingOption {
                month: Some(9),
                goodwill_bonus: Some(5),
            })
            .unwrap();

        let state = engine.snapshot();
        assert_eq!(state.timeline.month, 9);
        assert_eq!(state.goodwill, 105);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Channel::GoodwillChanged, Channel::TimelineUpdated]
        );
    }

    #[test]
    fn staff_registration_is_idempotent() {
        let mut engine = quiet_engine();
        let seen = record_channels(&mut engine, &[Channel::StaffAdded]);

        engine.register_staff_member("it_lead", Some("IT Lead"));
        engine.register_staff_member("it_lead", Some("IT Lead Again"));
        engine.register_staff_member("trainer", None);

        assert!(engine.has_staff_member("it_lead"));
        assert_eq!(engine.staff_ids(), vec!["it_lead", "trainer"]);
        let state = engine.snapshot();
        assert_eq!(state.staff.len(), 2);
        // Label defaults to the id when not supplied.
        assert_eq!(state.staff.get(1).unwrap().label, "trainer");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn log_entries_default_and_prepend() {
        let mut engine = quiet_engine();
        let first = engine.add_log_entry(NewLogEntry {
            kind: None,
            message: "Kickoff breakfast.".to_owned(),
            timestamp: None,
        });
        assert_eq!(first.kind, LogKind::Info);
        assert_eq!(
            first.timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
        );

        engine.add_log_entry(NewLogEntry::event("Projector caught fire."));
        let log = engine.travel_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log.first().unwrap().message, "Projector caught fire.");
    }

    #[test]
    fn travel_log_is_bounded_newest_first() {
        let mut engine = quiet_engine();
        for i in 0..15 {
            engine.add_log_entry(NewLogEntry::info(format!("stop {i}")));
        }
        let log = engine.travel_log();
        assert_eq!(log.len(), 12);
        assert_eq!(log.first().unwrap().message, "stop 14");
        assert_eq!(log.last().unwrap().message, "stop 3");
    }

    #[test]
    fn quiet_turn_applies_costs_and_advances() {
        let mut engine = quiet_engine();
        let seen = record_channels(
            &mut engine,
            &[
                Channel::BudgetChanged,
                Channel::MoraleChanged,
                Channel::GoodwillChanged,
                Channel::LogUpdated,
                Channel::ProgressAdvanced,
            ],
        );

        let outcome = engine.advance_campaign();

        assert!(!outcome.end_game);
        assert!(outcome.failure.is_none());
        assert!(outcome.event.is_none());
        assert_eq!(outcome.state.budget, 760);
        assert_eq!(outcome.state.morale, 66);
        assert_eq!(outcome.state.goodwill, 98);
        assert_eq!(outcome.state.campuses_reached, 1);
        assert_eq!(outcome.state.current_campus_index, 1);
        assert_eq!(outcome.state.timeline, Timeline { year: 2025, month: 2, day: 1 });

        let log = engine.travel_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log.first().unwrap().kind, LogKind::Info);

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[
                Channel::BudgetChanged,
                Channel::MoraleChanged,
                Channel::GoodwillChanged,
                Channel::LogUpdated,
                Channel::ProgressAdvanced,
            ]
        );
    }

    #[test]
    fn triggered_event_applies_effects_and_logs() {
        // First roll clears the threshold, second picks index 0. Only
        // flat_tire is eligible on campus 1.
        let mut engine = test_engine(CampaignTuning::default(), vec![0.0, 0.0]);
        let seen = record_channels(&mut engine, &[Channel::BudgetChanged, Channel::MoraleChanged]);

        let outcome = engine.advance_campaign();

        let event = outcome.event.unwrap();
        assert_eq!(event.id, "flat_tire");
        assert_eq!(outcome.state.budget, 735);
        assert_eq!(outcome.state.morale, 61);

        let log = engine.travel_log();
        let entry = log.first().unwrap();
        assert_eq!(entry.kind, LogKind::Event);
        assert_eq!(entry.message, "Flat tire: The van limps into the next town.");

        // Turn cost emission plus effect emission, for both resources.
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[
                Channel::BudgetChanged,
                Channel::MoraleChanged,
                Channel::BudgetChanged,
                Channel::MoraleChanged,
            ]
        );
    }

    #[test]
    fn failure_priority_prefers_budget_over_morale() {
        let tuning = CampaignTuning {
            starting_budget: 40,
            starting_morale: 4,
            ..CampaignTuning::default()
        };
        let mut engine = test_engine(tuning, vec![0.99]);
        let seen = record_channels(&mut engine, &[Channel::CampaignFailed]);

        let outcome = engine.advance_campaign();

        assert!(outcome.end_game);
        assert_eq!(outcome.failure, Some(FailureReason::Budget));
        assert_eq!(engine.phase(), CampaignPhase::Failed);
        assert_eq!(seen.lock().unwrap().as_slice(), &[Channel::CampaignFailed]);

        let log = engine.travel_log();
        assert_eq!(
            log.first().unwrap().message,
            "The rollout stalls after the budget runs dry."
        );
    }

    #[test]
    fn crossing_the_deadline_year_fails_on_time() {
        let mut engine = quiet_engine();
        engine
            .set_launch_timing(LaunchTimingOption {
                month: Some(12),
                goodwill_bonus: None,
            })
            .unwrap();

        let outcome = engine.advance_campaign();

        assert_eq!(outcome.failure, Some(FailureReason::Time));
        assert_eq!(outcome.state.timeline.year, 2026);
        assert_eq!(engine.phase(), CampaignPhase::Failed);
    }

    #[test]
    fn reaching_every_campus_completes_the_campaign() {
        let tuning = CampaignTuning {
            total_campuses: 1,
            ..CampaignTuning::default()
        };
        let mut engine = test_engine(tuning, vec![0.99]);
        let seen = record_channels(&mut engine, &[Channel::CampaignCompleted]);

        let outcome = engine.advance_campaign();

        assert!(outcome.end_game);
        assert!(outcome.failure.is_none());
        assert_eq!(engine.phase(), CampaignPhase::Completed);
        assert_eq!(seen.lock().unwrap().as_slice(), &[Channel::CampaignCompleted]);

        let log = engine.travel_log();
        assert_eq!(log.first().unwrap().kind, LogKind::Success);
    }

    #[test]
    fn progress_never_exceeds_the_campus_total() {
        let tuning = CampaignTuning {
            total_campuses: 2,
            ..CampaignTuning::default()
        };
        let events = EventCatalog {
            events: vec![EventDefinition {
                id: "leap".to_owned(),
                name: "Leap".to_owned(),
                description: "Three campuses sign at once.".to_owned(),
                conditions: EventConditions::default(),
                effects: EventEffects {
                    progress: Some(5),
                    ..EventEffects::default()
                },
            }],
        };
        let mut engine = CampaignEngine::with_sources(
            sample_prompts(),
            events,
            tuning,
            Box::new(SequenceRandomSource::new(vec![0.0, 0.0])),
            Box::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
            )),
        );

        let outcome = engine.advance_campaign();
        assert_eq!(outcome.state.campuses_reached, 2);
        assert_eq!(outcome.state.current_campus_index, 2);
        assert!(outcome.end_game);
    }

    #[test]
    fn advance_users_leaves_campaign_timeline_untouched() {
        let mut engine = quiet_engine();
        let seen = record_channels(&mut engine, &[Channel::UsersChanged]);

        let progress = engine.advance_users();

        assert_eq!(progress.from, 0);
        assert_eq!(progress.to, 1000);
        assert_eq!(progress.timeline_from, Timeline { year: 2025, month: 1, day: 1 });
        assert_eq!(progress.timeline_to, Timeline { year: 2025, month: 2, day: 1 });

        let state = engine.snapshot();
        assert_eq!(state.users, 1000);
        assert_eq!(state.progress_visits, 1);
        assert_eq!(state.timeline, Timeline { year: 2025, month: 1, day: 1 });
        assert_eq!(seen.lock().unwrap().as_slice(), &[Channel::UsersChanged]);
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut engine = quiet_engine();
        let before = engine.snapshot();
        engine.adjust_budget(-100);
        assert_eq!(before.budget, 800);
        assert_eq!(engine.snapshot().budget, 700);
    }

    #[test]
    fn unsubscribed_handlers_stop_firing() {
        let mut engine = quiet_engine();
        let seen = record_channels(&mut engine, &[Channel::BudgetChanged]);
        let id = engine.on(
            Channel::BudgetChanged,
            Box::new(|_notification, _state| {}),
        );
        engine.off(Channel::BudgetChanged, id);

        engine.adjust_budget(-10);
        engine.adjust_budget(-10);

        // The recorder stays subscribed; only the removed handler is gone.
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(engine.snapshot().budget, 780);
    }

    #[test]
    fn describe_failure_covers_every_reason() {
        assert_eq!(
            CampaignEngine::describe_failure(FailureReason::Morale),
            "Your core team burns out and refuses to continue."
        );
        assert_eq!(
            CampaignEngine::describe_failure(FailureReason::Goodwill),
            "Stakeholders withdraw support, halting the rollout."
        );
        assert_eq!(
            CampaignEngine::describe_failure(FailureReason::Time),
            "The academic year ends before you complete the rollout."
        );
    }

    #[test]
    fn pick_index_stays_in_bounds() {
        assert_eq!(pick_index(0.0, 3), 0);
        assert_eq!(pick_index(0.34, 3), 1);
        assert_eq!(pick_index(0.999, 3), 2);
        assert_eq!(pick_index(0.5, 0), 0);
    }

    #[test]
    fn format_timeline_uses_long_form() {
        let engine = quiet_engine();
        assert_eq!(engine.format_timeline(), "January 1, 2025");
    }
}
