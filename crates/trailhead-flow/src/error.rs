//! Error types for scene flow.

use crate::scene::SceneKey;

/// Errors raised by the scene flow controller.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A transition named a scene that was never registered. The current
    /// scene is left mounted.
    #[error("scene \"{key}\" is not registered")]
    UnknownScene {
        /// The unregistered scene key.
        key: SceneKey,
    },

    /// A scene failed to mount.
    #[error("scene \"{key}\" failed to mount: {message}")]
    Mount {
        /// The scene that failed.
        key: SceneKey,
        /// What went wrong, as reported by the scene.
        message: String,
    },
}
