//! The scene flow controller: one mounted scene at a time, transitions
//! driven by scene requests, deep links, and external token changes.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use trailhead_engine::CampaignEngine;
use trailhead_types::PromptCatalog;

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::scene::{
    NavigationQueue, Scene, SceneContext, SceneFactory, SceneKey, SceneProps, ShareToken, Surface,
};

/// Options for a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Whether to write the destination key to the share token.
    pub update_token: bool,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self { update_token: true }
    }
}

/// Drives scene lifecycle over a rendering surface.
///
/// Exactly zero or one scene is mounted at a time. Transitions destroy the
/// current scene before the next one mounts. Writes to the attached
/// [`ShareToken`] are commands issued only by [`Self::transition_to`];
/// externally observed token changes must arrive through
/// [`Self::token_changed`], which never writes the token back.
pub struct SceneFlowController {
    scenes: BTreeMap<SceneKey, SceneFactory>,
    current: Option<(SceneKey, Box<dyn Scene>)>,
    surface: Box<dyn Surface>,
    token: Option<Box<dyn ShareToken>>,
    game: Arc<Mutex<CampaignEngine>>,
    prompts: Arc<PromptCatalog>,
    flow: Arc<FlowConfig>,
    navigator: NavigationQueue,
}

impl core::fmt::Debug for SceneFlowController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneFlowController")
            .field("registered", &self.scenes.len())
            .field("current", &self.current.as_ref().map(|(key, _)| key))
            .finish_non_exhaustive()
    }
}

impl SceneFlowController {
    /// Create a controller with no registered scenes and no share token.
    #[must_use]
    pub fn new(
        surface: Box<dyn Surface>,
        game: Arc<Mutex<CampaignEngine>>,
        prompts: Arc<PromptCatalog>,
        flow: Arc<FlowConfig>,
    ) -> Self {
        Self {
            scenes: BTreeMap::new(),
            current: None,
            surface,
            token: None,
            game,
            prompts,
            flow,
            navigator: NavigationQueue::new(),
        }
    }

    /// Attach a share token. Subsequent transitions write the scene key to
    /// it unless told otherwise.
    pub fn attach_token(&mut self, token: Box<dyn ShareToken>) {
        self.token = Some(token);
    }

    /// Register a scene factory under a key. A later registration for the
    /// same key replaces the earlier one.
    pub fn register(&mut self, key: SceneKey, factory: SceneFactory) {
        self.scenes.insert(key, factory);
    }

    /// Whether a scene key is registered (deep-link validation).
    #[must_use]
    pub fn has_scene(&self, key: &SceneKey) -> bool {
        self.scenes.contains_key(key)
    }

    /// Key of the currently mounted scene, if any.
    #[must_use]
    pub fn current_scene(&self) -> Option<&SceneKey> {
        self.current.as_ref().map(|(key, _)| key)
    }

    /// A handle scenes outside the controller can queue navigation on.
    #[must_use]
    pub fn navigator(&self) -> NavigationQueue {
        self.navigator.clone()
    }

    /// Mount the first scene, then drain any navigation it queued.
    ///
    /// # Errors
    ///
    /// Propagates [`FlowError`] from the transition or any drained request.
    pub fn start(
        &mut self,
        key: SceneKey,
        props: SceneProps,
        options: TransitionOptions,
    ) -> Result<(), FlowError> {
        self.transition_to(key, props, options)?;
        self.pump()
    }

    /// Transition to a registered scene.
    ///
    /// The current scene (if any) is destroyed before the next one is
    /// constructed and mounted. With `options.update_token` and an attached
    /// token, the destination key is written to the token unless it already
    /// holds that value.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UnknownScene`] when the key is not registered;
    /// the current scene stays mounted and nothing is destroyed. Propagates
    /// [`FlowError::Mount`] when the new scene fails to render.
    pub fn transition_to(
        &mut self,
        key: SceneKey,
        props: SceneProps,
        options: TransitionOptions,
    ) -> Result<(), FlowError> {
        let factory = self
            .scenes
            .get(&key)
            .ok_or_else(|| FlowError::UnknownScene { key: key.clone() })?;

        if let Some((previous, mut scene)) = self.current.take() {
            debug!(from = %previous, to = %key, "scene transition");
            scene.destroy(self.surface.as_mut());
        } else {
            info!(scene = %key, "mounting first scene");
        }

        self.surface.set_scene_marker(&key);

        let context = SceneContext {
            game: Arc::clone(&self.game),
            prompts: Arc::clone(&self.prompts),
            flow: Arc::clone(&self.flow),
            navigator: self.navigator.clone(),
            scene: key.clone(),
            props,
        };
        let mut scene = factory(context);
        scene.mount(self.surface.as_mut())?;
        self.current = Some((key.clone(), scene));

        if options.update_token {
            if let Some(token) = self.token.as_mut() {
                if token.read().as_deref() != Some(key.as_str()) {
                    token.write(key.as_str());
                }
            }
        }
        Ok(())
    }

    /// Drain queued navigation requests, transitioning for each in order.
    ///
    /// Scenes queue navigation during mount and input handling; the driver
    /// calls this after delivering input.
    ///
    /// # Errors
    ///
    /// Propagates the first [`FlowError`] raised by a drained request.
    pub fn pump(&mut self) -> Result<(), FlowError> {
        while let Some(request) = self.navigator.pop() {
            self.transition_to(request.key, request.props, TransitionOptions::default())?;
        }
        Ok(())
    }

    /// Handle an externally observed token change.
    ///
    /// Empty values, the current scene's key, and unregistered keys are
    /// ignored. A different registered key transitions without writing the
    /// token back (the change was the outside world's, not ours), then
    /// drains queued navigation.
    ///
    /// # Errors
    ///
    /// Propagates [`FlowError::Mount`] from the resulting transition.
    pub fn token_changed(&mut self, value: &str) -> Result<(), FlowError> {
        if value.is_empty() {
            return Ok(());
        }
        let key = SceneKey::from(value);
        if self.current_scene() == Some(&key) || !self.has_scene(&key) {
            debug!(token = value, "ignoring token change");
            return Ok(());
        }
        self.transition_to(
            key,
            SceneProps::None,
            TransitionOptions {
                update_token: false,
            },
        )?;
        self.pump()
    }
}
