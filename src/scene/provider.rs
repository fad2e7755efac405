//! Scene state provider trait and core types
//!
//! Defines the interface the layer model and the camera resolver use to read
//! (and, for cameras, mutate) the host scene.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the layer every scene carries.
pub const DEFAULT_LAYER_NAME: &str = "defaultRenderLayer";

/// Prefix the host puts in front of non-default layer node names.
pub const LAYER_NODE_PREFIX: &str = "rs_";

/// Inclusive `[start, end]` frame interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

impl From<[i64; 2]> for FrameRange {
    fn from([start, end]: [i64; 2]) -> Self {
        Self { start, end }
    }
}

impl From<FrameRange> for [i64; 2] {
    fn from(range: FrameRange) -> Self {
        [range.start, range.end]
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read access to a 3D scene's render settings.
///
/// Layer queries take the host's *node* name (`rs_beauty`, or
/// `defaultRenderLayer`), never the display name.
pub trait SceneStateProvider {
    /// Full path of the open scene file.
    fn scene_path(&self) -> &str;

    /// Active project workspace directory.
    fn workspace(&self) -> &str;

    /// Node names of every render layer, in scene order.
    fn render_layer_nodes(&self) -> Vec<String>;

    /// Whether the layer node comes from a referenced file.
    fn is_referenced(&self, node: &str) -> bool;

    /// Raw value of the layer's renderable flag.
    fn renderable_flag(&self, node: &str) -> bool;

    /// Global frame range of the render settings.
    fn frame_range(&self) -> FrameRange;

    /// Global output resolution.
    fn resolution(&self) -> Resolution;

    /// Frame range evaluated with the given layer active.
    fn layer_frame_range(&self, node: &str) -> FrameRange {
        let _ = node;
        self.frame_range()
    }

    /// Output resolution evaluated with the given layer active.
    fn layer_resolution(&self, node: &str) -> Resolution {
        let _ = node;
        self.resolution()
    }

    /// Camera transform names.
    fn cameras(&self) -> Vec<String>;

    /// Set a camera's renderable flag. Returns false if the camera has no
    /// renderable attribute (or does not exist).
    fn set_camera_renderable(&mut self, camera: &str, renderable: bool) -> bool;

    /// Make the camera the active selection.
    fn select_camera(&mut self, camera: &str);

    /// Base file name of the scene (`shot010.mb`).
    fn scene_file_name(&self) -> String {
        let path = self.scene_path();
        path.rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(path)
            .to_string()
    }

    /// Renderable and not referenced.
    fn is_layer_renderable(&self, node: &str) -> bool {
        self.renderable_flag(node) && !self.is_referenced(node)
    }
}

/// Display name for a host layer node name.
pub fn layer_display_name(node: &str) -> &str {
    node.strip_prefix(LAYER_NODE_PREFIX).unwrap_or(node)
}
