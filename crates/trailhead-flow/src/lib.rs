//! Scene flow for the Trailhead campaign: registered scenes, a flow graph,
//! and a controller that keeps exactly one scene mounted at a time.
//!
//! - [`scene`] -- the view contract: [`Scene`], [`SceneContext`], typed
//!   [`SceneProps`], and the [`Surface`] / [`ShareToken`] seams
//! - [`controller`] -- the [`SceneFlowController`] driving transitions,
//!   navigation draining, and share-token handling
//! - [`config`] -- the external flow graph (`flow.json`)
//!
//! Navigation-token semantics: the controller's own writes are commands
//! issued during transitions; externally observed changes arrive through
//! [`SceneFlowController::token_changed`] and are never echoed back.

pub mod config;
pub mod controller;
pub mod error;
pub mod scene;

pub use config::FlowConfig;
pub use controller::{SceneFlowController, TransitionOptions};
pub use error::FlowError;
pub use scene::{
    NavigationQueue, NavigationRequest, Scene, SceneContext, SceneFactory, SceneKey, SceneProps,
    ShareToken, Surface,
};
