//! Console entry point for the Trailhead campaign simulation.
//!
//! Loads the engine tuning and the external catalogs (events, prompts,
//! flow graph), wires the campaign engine to the telemetry recorder over
//! the listener bus, registers the console scenes, and auto-plays a
//! campaign from the main menu (or a deep-linked scene) to an ending.
//! After the run it submits the session telemetry and prints the
//! leaderboard when an endpoint is configured.

mod scenes;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trailhead_engine::{CampaignConfig, CampaignEngine, load_event_catalog, load_prompt_catalog};
use trailhead_flow::{
    FlowConfig, SceneFlowController, SceneKey, SceneProps, ShareToken, Surface, TransitionOptions,
};
use trailhead_telemetry::{LeaderboardClient, TelemetryRecorder, resolve_endpoint};
use trailhead_types::{Channel, Notification};

use crate::scenes::{
    ChangeEngagementScene, EndingScene, MainMenuScene, ProgressScene, RoleSelectionScene,
    SCENE_COMPLETE, SCENE_ENGAGEMENT, SCENE_FAILED, SCENE_PROGRESS, SCENE_TRAVEL,
    StartTimingScene, TeamNamingScene, TravelScene,
};

/// Renders scenes to stdout.
#[derive(Debug, Default)]
struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn set_scene_marker(&mut self, key: &SceneKey) {
        println!("\n--- {key} ---");
    }

    fn clear(&mut self) {}

    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// In-memory share token; writes are surfaced in the logs so a session can
/// be resumed with a deep-link argument.
#[derive(Debug, Default)]
struct ConsoleToken {
    value: Option<String>,
}

impl ShareToken for ConsoleToken {
    fn read(&self) -> Option<String> {
        self.value.clone()
    }

    fn write(&mut self, value: &str) {
        self.value = Some(value.to_owned());
        info!(scene = value, "share token updated");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = Path::new("trailhead-config.yaml");
    let config = if config_path.exists() {
        CampaignConfig::from_file(config_path).context("loading trailhead-config.yaml")?
    } else {
        let mut config = CampaignConfig::default();
        config.endpoints.apply_env_overrides();
        config
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("trailhead starting");

    let events = load_event_catalog(Path::new("data/events.json")).context("loading events.json")?;
    let prompts =
        load_prompt_catalog(Path::new("data/prompts.json")).context("loading prompts.json")?;
    let flow: FlowConfig = serde_json::from_str(
        &std::fs::read_to_string("data/flow.json").context("reading flow.json")?,
    )
    .context("parsing flow.json")?;
    info!(
        events = events.events.len(),
        roles = prompts.role_options().len(),
        transitions = flow.transitions.len(),
        "catalogs loaded"
    );

    let telemetry_url = Some(config.endpoints.telemetry_url.clone()).filter(|url| !url.is_empty());
    let leaderboard_url = resolve_endpoint(
        Some(config.endpoints.leaderboard_url.as_str()).filter(|url| !url.is_empty()),
        telemetry_url.as_deref(),
    );
    let recorder = Arc::new(Mutex::new(TelemetryRecorder::new(telemetry_url)));

    let mut engine = CampaignEngine::new(prompts.clone(), events, config.campaign.clone());
    wire_telemetry(&mut engine, &recorder);
    let game = Arc::new(Mutex::new(engine));

    let mut controller = SceneFlowController::new(
        Box::new(ConsoleSurface),
        game,
        Arc::new(prompts),
        Arc::new(flow.clone()),
    );
    controller.attach_token(Box::new(ConsoleToken::default()));
    register_scenes(&mut controller);

    // A CLI argument acts as a deep link; unknown scenes fall back to the
    // configured initial scene.
    let initial = std::env::args()
        .nth(1)
        .map(|arg| SceneKey::from(arg.as_str()))
        .filter(|key| controller.has_scene(key))
        .unwrap_or(flow.initial_scene);

    controller
        .start(initial, SceneProps::None, TransitionOptions::default())
        .context("running the campaign")?;

    // The campaign is over; take the recorder out of the shared handle so
    // the final submission awaits on an owned value instead of holding the
    // lock across the call.
    let mut session = take_recorder(&recorder);
    let outcome = session.submit().await;
    info!(?outcome, "session telemetry submitted");

    if let Some(endpoint) = leaderboard_url {
        let client = LeaderboardClient::new(Some(endpoint));
        match client.fetch_top(trailhead_telemetry::DEFAULT_LIMIT).await {
            Ok(entries) => {
                println!("\n--- leaderboard ---");
                for (rank, entry) in entries.iter().enumerate() {
                    println!(
                        "{:>2}. {} ({}) {}",
                        rank.saturating_add(1),
                        entry.name,
                        entry.role,
                        entry.score
                    );
                }
            }
            Err(error) => warn!(%error, "leaderboard unavailable"),
        }
    }

    Ok(())
}

/// Swap the recorder out of the shared handle, leaving a disabled one
/// behind. The caller gets an owned recorder it can await on without the
/// bus handlers ever blocking on the lock.
fn take_recorder(recorder: &Arc<Mutex<TelemetryRecorder>>) -> TelemetryRecorder {
    let mut guard = match recorder.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    std::mem::replace(&mut *guard, TelemetryRecorder::new(None))
}

/// Mirror campaign identity changes into the telemetry payload.
fn wire_telemetry(engine: &mut CampaignEngine, recorder: &Arc<Mutex<TelemetryRecorder>>) {
    let for_role = Arc::clone(recorder);
    engine.on(
        Channel::RoleSelected,
        Box::new(move |notification, _state| {
            if let Notification::RoleSelected { role } = notification {
                if let Ok(mut recorder) = for_role.lock() {
                    recorder.set_role(role);
                }
            }
        }),
    );

    let for_team = Arc::clone(recorder);
    engine.on(
        Channel::TeamUpdated,
        Box::new(move |notification, _state| {
            if let Notification::TeamUpdated {
                team_name,
                teammates,
            } = notification
            {
                if let Ok(mut recorder) = for_team.lock() {
                    if let Some(name) = team_name {
                        recorder.set_team_name(name.clone());
                    }
                    if let Some(members) = teammates {
                        recorder.set_team_members(members.clone());
                    }
                }
            }
        }),
    );
}

/// Register every console scene under its flow key.
fn register_scenes(controller: &mut SceneFlowController) {
    controller.register(
        SceneKey::from("main_menu"),
        Box::new(|context| Box::new(MainMenuScene::new(context))),
    );
    controller.register(
        SceneKey::from("role_selection"),
        Box::new(|context| Box::new(RoleSelectionScene::new(context))),
    );
    controller.register(
        SceneKey::from("team_naming"),
        Box::new(|context| Box::new(TeamNamingScene::new(context))),
    );
    controller.register(
        SceneKey::from("start_timing"),
        Box::new(|context| Box::new(StartTimingScene::new(context))),
    );
    controller.register(
        SceneKey::from(SCENE_ENGAGEMENT),
        Box::new(|context| Box::new(ChangeEngagementScene::new(context))),
    );
    controller.register(
        SceneKey::from(SCENE_TRAVEL),
        Box::new(|context| Box::new(TravelScene::new(context))),
    );
    controller.register(
        SceneKey::from(SCENE_PROGRESS),
        Box::new(|context| Box::new(ProgressScene::new(context))),
    );
    controller.register(
        SceneKey::from(SCENE_FAILED),
        Box::new(|context| Box::new(EndingScene::new(context))),
    );
    controller.register(
        SceneKey::from(SCENE_COMPLETE),
        Box::new(|context| Box::new(EndingScene::new(context))),
    );
}
