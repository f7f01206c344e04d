//! Event eligibility predicates and effect application.
//!
//! These are pure functions over event definitions and campaign state:
//! the engine decides *whether* and *which* event fires, this module
//! decides *if it may* and *what it does*. Effect application produces a
//! new state record and reports resource changes through optional
//! callbacks so the engine can re-emit them as notifications.

use trailhead_types::{CampaignState, EventDefinition};

/// Morale ceiling shared with the engine's mutators.
pub const MAX_MORALE: u32 = 100;

/// Add a signed delta to a counter, flooring the result at zero.
#[must_use]
pub fn floored_add(current: u32, delta: i32) -> u32 {
    let next = i64::from(current).saturating_add(i64::from(delta));
    u32::try_from(next.max(0)).unwrap_or(u32::MAX)
}

/// Add a signed delta to a counter, clamping the result to `[0, max]`.
#[must_use]
pub fn clamped_add(current: u32, delta: i32, max: u32) -> u32 {
    floored_add(current, delta).min(max)
}

/// Callbacks invoked with the new value when effect application changes a
/// resource. Absent callbacks are skipped.
#[derive(Default)]
pub struct EffectCallbacks<'a> {
    /// Invoked with the new budget after a budget effect.
    pub on_budget_change: Option<&'a mut dyn FnMut(u32)>,
    /// Invoked with the new goodwill after a goodwill effect.
    pub on_goodwill_change: Option<&'a mut dyn FnMut(u32)>,
    /// Invoked with the new morale after a morale effect.
    pub on_morale_change: Option<&'a mut dyn FnMut(u32)>,
}

impl core::fmt::Debug for EffectCallbacks<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectCallbacks")
            .field("on_budget_change", &self.on_budget_change.is_some())
            .field("on_goodwill_change", &self.on_goodwill_change.is_some())
            .field("on_morale_change", &self.on_morale_change.is_some())
            .finish()
    }
}

/// Return whether a single event's conditions are satisfied by the state.
///
/// - `min_campus` passes when it is at most `campuses_reached`.
/// - `min_engagement` passes only on strict label equality.
/// - `requires_staff` passes when every listed id is on the roster.
///
/// Absent conditions always pass.
#[must_use]
pub fn is_event_eligible(event: &EventDefinition, state: &CampaignState) -> bool {
    let conditions = &event.conditions;

    if let Some(min_campus) = conditions.min_campus {
        if state.campuses_reached < min_campus {
            return false;
        }
    }

    if let Some(min_engagement) = &conditions.min_engagement {
        if &state.engagement != min_engagement {
            return false;
        }
    }

    if let Some(required) = &conditions.requires_staff {
        let unmet = required
            .iter()
            .any(|staff_id| !state.staff.iter().any(|member| &member.id == staff_id));
        if unmet {
            return false;
        }
    }

    true
}

/// Return the subsequence of `events` eligible under `state`, preserving
/// input order.
#[must_use]
pub fn filter_eligible_events<'a>(
    events: &'a [EventDefinition],
    state: &CampaignState,
) -> Vec<&'a EventDefinition> {
    events
        .iter()
        .filter(|event| is_event_eligible(event, state))
        .collect()
}

/// Apply an event's effects to a copy of the state, returning the new record.
///
/// Budget and goodwill deltas are floored at zero; morale is clamped to
/// `[0, MAX_MORALE]`; progress is added to `campuses_reached` and floored at
/// zero. There is deliberately no progress ceiling here -- the turn
/// algorithm owns that clamp. Absent (or zero) effect keys are no-ops, and
/// no-op keys do not invoke their callbacks.
#[must_use]
pub fn apply_event_effects(
    event: &EventDefinition,
    state: &CampaignState,
    callbacks: &mut EffectCallbacks<'_>,
) -> CampaignState {
    let mut next = state.clone();
    let effects = &event.effects;

    if let Some(delta) = effects.budget.filter(|delta| *delta != 0) {
        next.budget = floored_add(next.budget, delta);
        if let Some(on_budget) = callbacks.on_budget_change.as_mut() {
            on_budget(next.budget);
        }
    }

    if let Some(delta) = effects.goodwill.filter(|delta| *delta != 0) {
        next.goodwill = floored_add(next.goodwill, delta);
        if let Some(on_goodwill) = callbacks.on_goodwill_change.as_mut() {
            on_goodwill(next.goodwill);
        }
    }

    if let Some(delta) = effects.morale.filter(|delta| *delta != 0) {
        next.morale = clamped_add(next.morale, delta, MAX_MORALE);
        if let Some(on_morale) = callbacks.on_morale_change.as_mut() {
            on_morale(next.morale);
        }
    }

    if let Some(delta) = effects.progress.filter(|delta| *delta != 0) {
        next.campuses_reached = floored_add(next.campuses_reached, delta);
    }

    next
}
