//! The view contract: scenes, their props, and the seams they render
//! through.
//!
//! A scene is a mounted view over the campaign engine. The controller
//! constructs scenes from registered factories, hands each one a
//! [`SceneContext`], and drives `mount`/`destroy` around transitions.
//! Rendering goes through the [`Surface`] seam so the same scenes work
//! against a terminal, a test recorder, or a richer front end.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use trailhead_engine::CampaignEngine;
use trailhead_types::{CampaignState, FailureReason, PromptCatalog};

use crate::config::FlowConfig;
use crate::error::FlowError;

/// A registered scene's stable key (also the share-token value).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneKey(String);

impl SceneKey {
    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SceneKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for SceneKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed per-scene props passed through a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SceneProps {
    /// No props (deep links and token-driven transitions).
    #[default]
    None,
    /// The scene was entered from another scene's menu or flow step.
    Entry {
        /// The scene that requested the transition.
        source: SceneKey,
    },
    /// The scene should return to a specific scene when dismissed.
    Return {
        /// Destination on dismissal.
        return_to: SceneKey,
    },
    /// End-of-campaign narration props.
    Ending {
        /// Final state snapshot, when the caller has one in hand.
        snapshot: Option<CampaignState>,
        /// Failure reason, absent for completion endings.
        reason: Option<FailureReason>,
    },
}

/// Rendering seam scenes draw through.
pub trait Surface {
    /// Mark the surface with the active scene key (background, title bar).
    fn set_scene_marker(&mut self, key: &SceneKey);
    /// Clear all rendered content.
    fn clear(&mut self);
    /// Render one line of content.
    fn line(&mut self, text: &str);
}

/// External navigation token (the shareable location fragment).
///
/// Writes issued by the controller are commands that update the token;
/// changes observed from outside arrive via
/// [`SceneFlowController::token_changed`](crate::controller::SceneFlowController::token_changed).
pub trait ShareToken {
    /// Current token value, if any.
    fn read(&self) -> Option<String>;
    /// Overwrite the token value.
    fn write(&mut self, value: &str);
}

/// A navigation request queued by a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    /// Destination scene.
    pub key: SceneKey,
    /// Props for the destination.
    pub props: SceneProps,
}

/// Shared handle scenes use to request navigation.
///
/// Scenes never hold the controller directly; they queue requests here and
/// the controller drains the queue after each mount and input delivery.
#[derive(Debug, Clone, Default)]
pub struct NavigationQueue {
    requests: Arc<Mutex<VecDeque<NavigationRequest>>>,
}

impl NavigationQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a navigation request.
    pub fn request(&self, key: SceneKey, props: SceneProps) {
        let mut queue = match self.requests.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.push_back(NavigationRequest { key, props });
    }

    /// Take the next queued request, oldest first.
    pub fn pop(&self) -> Option<NavigationRequest> {
        let mut queue = match self.requests.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.pop_front()
    }

    /// Whether any requests are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let queue = match self.requests.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.is_empty()
    }
}

/// Everything a scene factory receives when the controller constructs a
/// scene.
pub struct SceneContext {
    /// Shared handle to the campaign engine.
    pub game: Arc<Mutex<CampaignEngine>>,
    /// Text prompt catalog (scene copy, role options).
    pub prompts: Arc<PromptCatalog>,
    /// The flow graph, for named transition lookups.
    pub flow: Arc<FlowConfig>,
    /// Queue for requesting navigation.
    pub navigator: NavigationQueue,
    /// The key this scene was registered under.
    pub scene: SceneKey,
    /// Props supplied by the transition.
    pub props: SceneProps,
}

impl core::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneContext")
            .field("scene", &self.scene)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

/// A mounted view over the campaign engine.
pub trait Scene {
    /// Render the scene onto the surface.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Mount`] when the scene cannot render (missing
    /// prompt block, inconsistent props).
    fn mount(&mut self, surface: &mut dyn Surface) -> Result<(), FlowError>;

    /// Tear the scene down before the next mount. Implementations must
    /// cancel any scene-local pending work here.
    fn destroy(&mut self, surface: &mut dyn Surface) {
        let _ = surface;
    }
}

/// Constructor for a registered scene.
pub type SceneFactory = Box<dyn Fn(SceneContext) -> Box<dyn Scene>>;
