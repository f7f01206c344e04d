//! The flow graph: which scene opens the campaign and where each named
//! transition leads.
//!
//! The graph arrives as an external JSON document (`flow.json`) so the
//! scene order can be rearranged without touching scene code. Transition
//! keys follow the `"<scene>.<choice>"` convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::SceneKey;

/// The external flow graph (`flow.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    /// Scene mounted at startup when no deep link overrides it.
    #[serde(default = "default_initial_scene")]
    pub initial_scene: SceneKey,

    /// Named transitions, `"<scene>.<choice>"` to destination scene.
    #[serde(default)]
    pub transitions: BTreeMap<String, SceneKey>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            initial_scene: default_initial_scene(),
            transitions: BTreeMap::new(),
        }
    }
}

impl FlowConfig {
    /// Resolve a named transition, falling back when the graph omits it.
    #[must_use]
    pub fn resolve_transition(&self, key: &str, fallback: &str) -> SceneKey {
        self.transitions
            .get(key)
            .cloned()
            .unwrap_or_else(|| SceneKey::from(fallback))
    }
}

fn default_initial_scene() -> SceneKey {
    SceneKey::from("main_menu")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_from_json() {
        let json = r#"{
            "initialScene": "main_menu",
            "transitions": {
                "main_menu.start": "role_selection",
                "cutscene.intro": "travel"
            }
        }"#;
        let flow: FlowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(flow.initial_scene, SceneKey::from("main_menu"));
        assert_eq!(
            flow.resolve_transition("cutscene.intro", "travel"),
            SceneKey::from("travel")
        );
        assert_eq!(
            flow.resolve_transition("main_menu.start", "travel"),
            SceneKey::from("role_selection")
        );
    }

    #[test]
    fn missing_transition_uses_fallback() {
        let flow = FlowConfig::default();
        assert_eq!(
            flow.resolve_transition("quiz.done", "travel"),
            SceneKey::from("travel")
        );
    }

    #[test]
    fn empty_document_defaults_to_main_menu() {
        let flow: FlowConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(flow.initial_scene, SceneKey::from("main_menu"));
        assert!(flow.transitions.is_empty());
    }
}
