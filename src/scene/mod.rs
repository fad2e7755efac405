//! Scene state access
//!
//! This module provides:
//! - `SceneStateProvider` trait over the host scene
//! - `SceneSnapshot`, a YAML-backed provider
//! - Render camera resolution

mod camera;
mod provider;
mod snapshot;

pub use camera::{resolve_render_camera, SHOT_CAMERA_TAG};
pub use provider::{
    layer_display_name, FrameRange, Resolution, SceneStateProvider,
    DEFAULT_LAYER_NAME, LAYER_NODE_PREFIX,
};
pub use snapshot::{SceneSnapshot, SnapshotCamera, SnapshotLayer};
