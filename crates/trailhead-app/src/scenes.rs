//! Console implementations of the campaign scenes.
//!
//! Each scene renders onto the injected [`Surface`] and queues its next
//! step on the navigation queue, so a single `start` call auto-plays the
//! campaign from the main menu to an ending. Destinations come from the
//! flow graph wherever one is configured.

use std::sync::{Arc, Mutex, MutexGuard};

use trailhead_engine::{CampaignEngine, LaunchTimingOption, NewLogEntry, timeline};
use trailhead_flow::{FlowError, Scene, SceneContext, SceneKey, SceneProps, Surface};

/// Scene key for the failure ending.
pub const SCENE_FAILED: &str = "campaign_failed";
/// Scene key for the completion ending.
pub const SCENE_COMPLETE: &str = "campaign_complete";
/// Scene key for the travel loop.
pub const SCENE_TRAVEL: &str = "travel";
/// Scene key for the engagement-level choice.
pub const SCENE_ENGAGEMENT: &str = "change_engagement";
/// Scene key for the growth interlude between campuses.
pub const SCENE_PROGRESS: &str = "progress_status";

/// Lock the shared engine, recovering from a poisoned lock.
fn lock(game: &Arc<Mutex<CampaignEngine>>) -> MutexGuard<'_, CampaignEngine> {
    match game.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Render a prompt block's `title` and `body` fields, when present.
fn render_block(context: &SceneContext, surface: &mut dyn Surface, key: &str) {
    let Some(block) = context.prompts.block(key) else {
        return;
    };
    if let Some(title) = block.get("title").and_then(|value| value.as_str()) {
        surface.line(title);
    }
    if let Some(body) = block.get("body").and_then(|value| value.as_array()) {
        for line in body.iter().filter_map(|value| value.as_str()) {
            surface.line(line);
        }
    }
}

/// The opening menu: renders the campaign pitch and heads into role
/// selection.
pub struct MainMenuScene {
    context: SceneContext,
}

impl MainMenuScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for MainMenuScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "main_menu");
        let next = self
            .context
            .flow
            .resolve_transition("main_menu.start", "role_selection");
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// Role selection: lists the catalog roles and selects the first one.
pub struct RoleSelectionScene {
    context: SceneContext,
}

impl RoleSelectionScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for RoleSelectionScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "role_selection_intro");

        let mut game = lock(&self.context.game);
        for option in game.role_options() {
            surface.line(&format!("  - {} ({})", option.label, option.id));
        }
        let Some(chosen) = game.role_options().first().map(|option| option.id.clone()) else {
            return Err(FlowError::Mount {
                key: self.context.scene.clone(),
                message: "role catalog is empty".to_owned(),
            });
        };
        let role = game
            .select_role(&chosen)
            .map_err(|error| FlowError::Mount {
                key: self.context.scene.clone(),
                message: error.to_string(),
            })?;
        drop(game);

        surface.line(&format!("You take the road as {}.", role.label));
        let next = self
            .context
            .flow
            .resolve_transition("role_selection.next", "team_naming");
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// Team naming: records the team name and teammates.
pub struct TeamNamingScene {
    context: SceneContext,
}

impl TeamNamingScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for TeamNamingScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "team_naming");

        let block = self.context.prompts.block("team_naming");
        let team_name = block
            .and_then(|value| value.get("defaultName"))
            .and_then(|value| value.as_str())
            .unwrap_or("Trailblazers")
            .to_owned();
        let teammates: Vec<String> = block
            .and_then(|value| value.get("defaultTeammates"))
            .and_then(|value| value.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| value.as_str())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let mut game = lock(&self.context.game);
        game.update_team_name(team_name.clone());
        game.update_teammates(teammates);
        drop(game);

        surface.line(&format!("The team signs in as \"{team_name}\"."));
        let next = self
            .context
            .flow
            .resolve_transition("team_naming.next", "start_timing");
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// Launch timing: applies the first timing option from the prompt catalog.
pub struct StartTimingScene {
    context: SceneContext,
}

impl StartTimingScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for StartTimingScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "start_timing");

        let option = self
            .context
            .prompts
            .block("start_timing")
            .and_then(|value| value.get("options"))
            .and_then(|value| value.as_array())
            .and_then(|options| options.first())
            .map_or(LaunchTimingOption::default(), |value| LaunchTimingOption {
                month: value
                    .get("month")
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|month| u32::try_from(month).ok()),
                goodwill_bonus: value
                    .get("goodwillBonus")
                    .and_then(serde_json::Value::as_i64)
                    .and_then(|bonus| i32::try_from(bonus).ok()),
            });

        let mut game = lock(&self.context.game);
        game.set_launch_timing(option)
            .map_err(|error| FlowError::Mount {
                key: self.context.scene.clone(),
                message: error.to_string(),
            })?;
        game.add_log_entry(NewLogEntry::info("The rollout tour departs."));
        let departure = game.format_timeline();
        drop(game);

        surface.line(&format!("Departure set for {departure}."));
        let next = self
            .context
            .flow
            .resolve_transition("start_timing.next", SCENE_TRAVEL);
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// Engagement choice: applies a level from the `engagement_levels` catalog
/// block (the block's `defaultChoice`, or its first option) and logs it.
pub struct ChangeEngagementScene {
    context: SceneContext,
}

impl ChangeEngagementScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for ChangeEngagementScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "engagement_levels");

        let block = self.context.prompts.block("engagement_levels");
        let options = block
            .and_then(|value| value.get("options"))
            .and_then(|value| value.as_array());
        let default_choice = block
            .and_then(|value| value.get("defaultChoice"))
            .and_then(|value| value.as_str());
        let chosen = options.and_then(|options| {
            options
                .iter()
                .find(|option| {
                    option.get("id").and_then(|id| id.as_str()) == default_choice
                })
                .or_else(|| options.first())
        });
        let Some(chosen) = chosen else {
            return Err(FlowError::Mount {
                key: self.context.scene.clone(),
                message: "engagement catalog is empty".to_owned(),
            });
        };
        let id = chosen
            .get("id")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_owned();
        let label = chosen
            .get("label")
            .and_then(|value| value.as_str())
            .unwrap_or(&id)
            .to_owned();

        let mut game = lock(&self.context.game);
        game.set_engagement(id);
        game.add_log_entry(NewLogEntry::info(format!(
            "Engagement level set to {}.",
            label.to_lowercase()
        )));
        drop(game);

        let next = match &self.context.props {
            SceneProps::Return { return_to } => return_to.clone(),
            _ => self
                .context
                .flow
                .resolve_transition("change_engagement.next", SCENE_TRAVEL),
        };
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// Growth interlude: advances the user counter and its derived timeline,
/// then hands back to the travel loop.
pub struct ProgressScene {
    context: SceneContext,
}

impl ProgressScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for ProgressScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();
        render_block(&self.context, surface, "progress_status");

        let mut game = lock(&self.context.game);
        let progress = game.advance_users();
        drop(game);

        surface.line(&format!(
            "Users reached: {} (was {})",
            progress.to, progress.from
        ));
        surface.line(&format!(
            "As of {}.",
            timeline::format(&progress.timeline_to)
        ));

        let next = self
            .context
            .flow
            .resolve_transition("progress_status.continue", SCENE_TRAVEL);
        self.context.navigator.request(
            next,
            SceneProps::Entry {
                source: self.context.scene.clone(),
            },
        );
        Ok(())
    }
}

/// The travel loop: one mount is one turn. Routes each leg through the
/// flow graph until the campaign ends, then hands off to the matching
/// ending scene.
pub struct TravelScene {
    context: SceneContext,
}

impl TravelScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for TravelScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        let mut game = lock(&self.context.game);
        let outcome = game.advance_campaign();
        let remaining = game.remaining_campuses();
        let when = game.format_timeline();
        drop(game);

        surface.line(&format!(
            "{when} | campus {}/{} | budget {} | goodwill {} | morale {}",
            outcome.state.campuses_reached,
            outcome.state.campuses_reached.saturating_add(remaining),
            outcome.state.budget,
            outcome.state.goodwill,
            outcome.state.morale,
        ));
        if let Some(entry) = outcome.state.travel_log.first() {
            surface.line(&format!("  {}", entry.message));
        }

        if outcome.end_game {
            let key = if outcome.failure.is_some() {
                SCENE_FAILED
            } else {
                SCENE_COMPLETE
            };
            self.context.navigator.request(
                SceneKey::from(key),
                SceneProps::Ending {
                    snapshot: Some(outcome.state),
                    reason: outcome.failure,
                },
            );
        } else {
            let next = self
                .context
                .flow
                .resolve_transition("travel.continue", SCENE_TRAVEL);
            self.context.navigator.request(next, SceneProps::None);
        }
        Ok(())
    }
}

/// End-of-campaign narration, shared by the failure and completion keys.
pub struct EndingScene {
    context: SceneContext,
}

impl EndingScene {
    /// Create the scene from its context.
    #[must_use]
    pub const fn new(context: SceneContext) -> Self {
        Self { context }
    }
}

impl Scene for EndingScene {
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError> {
        surface.clear();

        let (snapshot, reason) = match &self.context.props {
            SceneProps::Ending { snapshot, reason } => (snapshot.clone(), *reason),
            _ => (None, None),
        };
        let snapshot = snapshot.unwrap_or_else(|| lock(&self.context.game).snapshot());

        if let Some(reason) = reason {
            surface.line(CampaignEngine::describe_failure(reason));
        } else {
            render_block(&self.context, surface, "campaign_complete");
        }
        surface.line(&format!(
            "Final tally: {} campuses, {} users reached, budget {} remaining.",
            snapshot.campuses_reached, snapshot.users, snapshot.budget,
        ));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use trailhead_engine::CampaignTuning;
    use trailhead_flow::{FlowConfig, NavigationQueue};
    use trailhead_types::{EventCatalog, PromptCatalog};

    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        lines: Vec<String>,
    }

    impl Surface for RecordingSurface {
        fn set_scene_marker(&mut self, _key: &SceneKey) {}

        fn clear(&mut self) {
            self.lines.clear();
        }

        fn line(&mut self, text: &str) {
            self.lines.push(text.to_owned());
        }
    }

    fn engagement_prompts() -> PromptCatalog {
        serde_json::from_value(json!({
            "engagement_levels": {
                "title": "Set the engagement level",
                "defaultChoice": "thriving",
                "options": [
                    { "id": "filling", "label": "Filling up" },
                    { "id": "thriving", "label": "Thriving" },
                    { "id": "fading", "label": "Fading" }
                ]
            }
        }))
        .unwrap()
    }

    fn context(
        prompts: PromptCatalog,
        flow: FlowConfig,
        scene: &str,
        props: SceneProps,
    ) -> SceneContext {
        let engine = CampaignEngine::new(
            prompts.clone(),
            EventCatalog::default(),
            CampaignTuning::default(),
        );
        SceneContext {
            game: Arc::new(Mutex::new(engine)),
            prompts: Arc::new(prompts),
            flow: Arc::new(flow),
            navigator: NavigationQueue::new(),
            scene: SceneKey::from(scene),
            props,
        }
    }

    #[test]
    fn engagement_scene_applies_the_default_choice() {
        let context = context(
            engagement_prompts(),
            FlowConfig::default(),
            SCENE_ENGAGEMENT,
            SceneProps::None,
        );
        let game = Arc::clone(&context.game);
        let navigator = context.navigator.clone();

        let mut scene = ChangeEngagementScene::new(context);
        let mut surface = RecordingSurface::default();
        scene.mount(&mut surface).unwrap();

        let snapshot = lock(&game).snapshot();
        assert_eq!(snapshot.engagement, "thriving");
        assert_eq!(
            snapshot.travel_log.first().map(|entry| entry.message.as_str()),
            Some("Engagement level set to thriving.")
        );

        let queued = navigator.pop().unwrap();
        assert_eq!(queued.key, SceneKey::from(SCENE_TRAVEL));
        assert_eq!(
            queued.props,
            SceneProps::Entry {
                source: SceneKey::from(SCENE_ENGAGEMENT),
            }
        );
    }

    #[test]
    fn engagement_scene_honors_a_return_destination() {
        let context = context(
            engagement_prompts(),
            FlowConfig::default(),
            SCENE_ENGAGEMENT,
            SceneProps::Return {
                return_to: SceneKey::from("start_timing"),
            },
        );
        let navigator = context.navigator.clone();

        let mut scene = ChangeEngagementScene::new(context);
        let mut surface = RecordingSurface::default();
        scene.mount(&mut surface).unwrap();

        let queued = navigator.pop().unwrap();
        assert_eq!(queued.key, SceneKey::from("start_timing"));
    }

    #[test]
    fn engagement_scene_rejects_an_empty_catalog() {
        let context = context(
            PromptCatalog::default(),
            FlowConfig::default(),
            SCENE_ENGAGEMENT,
            SceneProps::None,
        );
        let mut scene = ChangeEngagementScene::new(context);
        let mut surface = RecordingSurface::default();
        let error = scene.mount(&mut surface).unwrap_err();
        assert!(matches!(error, FlowError::Mount { .. }));
    }

    #[test]
    fn progress_scene_advances_users_and_returns_to_travel() {
        let prompts: PromptCatalog = serde_json::from_value(json!({
            "progress_status": { "title": "Reach so far" }
        }))
        .unwrap();
        let context = context(
            prompts,
            FlowConfig::default(),
            SCENE_PROGRESS,
            SceneProps::Entry {
                source: SceneKey::from(SCENE_TRAVEL),
            },
        );
        let game = Arc::clone(&context.game);
        let navigator = context.navigator.clone();

        let mut scene = ProgressScene::new(context);
        let mut surface = RecordingSurface::default();
        scene.mount(&mut surface).unwrap();

        assert_eq!(lock(&game).users(), 1000);
        assert!(
            surface
                .lines
                .iter()
                .any(|line| line.starts_with("Users reached: 1000"))
        );

        let queued = navigator.pop().unwrap();
        assert_eq!(queued.key, SceneKey::from(SCENE_TRAVEL));
    }

    #[test]
    fn travel_scene_routes_its_next_leg_through_the_flow_graph() {
        let flow: FlowConfig = serde_json::from_value(json!({
            "transitions": { "travel.continue": "progress_status" }
        }))
        .unwrap();
        let context = context(
            PromptCatalog::default(),
            flow,
            SCENE_TRAVEL,
            SceneProps::None,
        );
        let navigator = context.navigator.clone();

        let mut scene = TravelScene::new(context);
        let mut surface = RecordingSurface::default();
        scene.mount(&mut surface).unwrap();

        let queued = navigator.pop().unwrap();
        assert_eq!(queued.key, SceneKey::from(SCENE_PROGRESS));
    }
}
