//! Externally supplied catalogs: the event deck, role options, and text
//! prompts.
//!
//! Catalogs are immutable per campaign. They arrive as JSON documents
//! (`events.json`, `prompts.json`) loaded at bootstrap; the engine treats
//! them as read-only lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Conditions gating whether an event may be selected in a turn.
///
/// Every condition is optional; an absent condition always passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct EventConditions {
    /// Minimum campuses reached before the event becomes eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_campus: Option<u32>,
    /// Engagement label the state must strictly equal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_engagement: Option<String>,
    /// Staff ids that must all be present in the state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_staff: Option<Vec<String>>,
}

/// Deltas an event applies when triggered.
///
/// Absent (or zero) effect keys are no-ops; catalogs simply omit unused
/// effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct EventEffects {
    /// Budget delta (floored at 0 on application).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<i32>,
    /// Goodwill delta (floored at 0 on application).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodwill: Option<i32>,
    /// Morale delta (clamped to `[0, 100]` on application).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morale: Option<i32>,
    /// Progress delta applied to campuses reached (floored at 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
}

/// A scripted event definition from the external event catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDefinition {
    /// Stable event identifier.
    pub id: String,
    /// Short event name used in log narration.
    pub name: String,
    /// Longer description used in log narration.
    pub description: String,
    /// Eligibility conditions.
    #[serde(default)]
    pub conditions: EventConditions,
    /// Effects applied when the event triggers.
    #[serde(default)]
    pub effects: EventEffects,
}

/// The external event catalog (`events.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCatalog {
    /// The event deck, in catalog order.
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// Look up an event by id.
    pub fn event_by_id(&self, event_id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|event| event.id == event_id)
    }
}

/// A selectable role from the prompt catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoleOption {
    /// Stable role identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Longer description (optional in the catalog).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The role selection block of the prompt catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSelectionPrompts {
    /// Selectable roles, in catalog order.
    #[serde(default)]
    pub options: Vec<RoleOption>,
}

/// The external text prompt catalog (`prompts.json`).
///
/// The role selection block is strongly typed because the engine depends on
/// it; every other block is scene copy consumed opaquely by views and kept
/// as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptCatalog {
    /// Role selection options.
    #[serde(default)]
    pub role_selection: RoleSelectionPrompts,
    /// All remaining prompt blocks, keyed by scene or block name.
    #[serde(flatten)]
    pub blocks: BTreeMap<String, serde_json::Value>,
}

impl PromptCatalog {
    /// Return the prompt block for the given key, if present.
    pub fn block(&self, key: &str) -> Option<&serde_json::Value> {
        self.blocks.get(key)
    }

    /// Return the role options from the role selection block.
    pub fn role_options(&self) -> &[RoleOption] {
        &self.role_selection.options
    }

    /// Look up a role option by id.
    pub fn role_by_id(&self, role_id: &str) -> Option<&RoleOption> {
        self.role_options().iter().find(|role| role.id == role_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_catalog_parses_with_defaults() {
        let json = r#"{
            "events": [
                {
                    "id": "flat_tire",
                    "name": "Flat tire",
                    "description": "The van limps into the next town.",
                    "effects": { "budget": -25 }
                },
                {
                    "id": "press_feature",
                    "name": "Press feature",
                    "description": "A local paper covers the tour.",
                    "conditions": { "minCampus": 3 },
                    "effects": { "goodwill": 10, "morale": 5 }
                }
            ]
        }"#;

        let catalog: EventCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.events.len(), 2);

        let flat = catalog.event_by_id("flat_tire").unwrap();
        assert_eq!(flat.effects.budget, Some(-25));
        assert_eq!(flat.conditions.min_campus, None);

        let press = catalog.event_by_id("press_feature").unwrap();
        assert_eq!(press.conditions.min_campus, Some(3));
        assert_eq!(press.effects.progress, None);
    }

    #[test]
    fn event_by_id_misses_unknown() {
        let catalog = EventCatalog::default();
        assert!(catalog.event_by_id("nope").is_none());
    }

    #[test]
    fn prompt_catalog_splits_typed_and_opaque_blocks() {
        let json = r#"{
            "role_selection": {
                "options": [
                    { "id": "coordinator", "label": "Coordinator" },
                    { "id": "evangelist", "label": "Evangelist", "description": "Spreads the word." }
                ]
            },
            "main_menu": { "title": "Trailhead" }
        }"#;

        let catalog: PromptCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.role_options().len(), 2);
        assert_eq!(
            catalog.role_by_id("coordinator").map(|r| r.label.as_str()),
            Some("Coordinator")
        );
        assert!(catalog.role_by_id("missing").is_none());
        assert!(catalog.block("main_menu").is_some());
        assert!(catalog.block("quiz_intro").is_none());
    }

    #[test]
    fn conditions_use_camel_case_wire_names() {
        let json = r#"{ "minCampus": 5, "requiresStaff": ["it_lead"] }"#;
        let conditions: EventConditions = serde_json::from_str(json).unwrap();
        assert_eq!(conditions.min_campus, Some(5));
        assert_eq!(
            conditions.requires_staff.as_deref(),
            Some(["it_lead".to_owned()].as_slice())
        );
    }
}
