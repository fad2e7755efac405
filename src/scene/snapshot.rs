//! File-backed scene state
//!
//! A `SceneSnapshot` is a YAML description of the render settings exported
//! from the host application. It lets the CLI run the synthesis pipeline
//! without a live host session.
//!
//! ```yaml
//! scene_path: /jobs/show/shot010/scenes/shot010_lighting.mb
//! workspace: /jobs/show/shot010
//! resolution: { width: 1920, height: 1080 }
//! frame_range: [1, 100]
//! layers:
//!   - name: defaultRenderLayer
//!     renderable: false
//!   - name: rs_beauty
//!     frame_range: [1, 50]
//! cameras:
//!   - name: persp
//!     renderable: true
//!   - name: shotCam_main
//!     renderable: false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::provider::{FrameRange, Resolution, SceneStateProvider};
use crate::error::{LayerJobError, Result};

/// A render layer as recorded in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLayer {
    /// Host node name (`rs_` prefix for non-default layers).
    pub name: String,

    #[serde(default = "default_true")]
    pub renderable: bool,

    #[serde(default)]
    pub referenced: bool,

    /// Per-layer override of the global frame range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<FrameRange>,

    /// Per-layer override of the global resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

/// A camera as recorded in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCamera {
    pub name: String,

    /// `None` when the camera shape has no renderable attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderable: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Scene state loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub scene_path: String,

    #[serde(default)]
    pub workspace: String,

    pub resolution: Resolution,

    pub frame_range: FrameRange,

    #[serde(default)]
    pub layers: Vec<SnapshotLayer>,

    #[serde(default)]
    pub cameras: Vec<SnapshotCamera>,

    /// Camera selected by the last `select_camera` call.
    #[serde(skip)]
    pub selected_camera: Option<String>,
}

impl SceneSnapshot {
    /// Load a snapshot from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LayerJobError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| LayerJobError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse a snapshot from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn layer(&self, node: &str) -> Option<&SnapshotLayer> {
        self.layers.iter().find(|l| l.name == node)
    }

    /// Current renderable flag of a camera, if it has one.
    pub fn camera_renderable(&self, camera: &str) -> Option<bool> {
        self.cameras
            .iter()
            .find(|c| c.name == camera)
            .and_then(|c| c.renderable)
    }
}

impl SceneStateProvider for SceneSnapshot {
    fn scene_path(&self) -> &str {
        &self.scene_path
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }

    fn render_layer_nodes(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }

    fn is_referenced(&self, node: &str) -> bool {
        self.layer(node).map(|l| l.referenced).unwrap_or(false)
    }

    fn renderable_flag(&self, node: &str) -> bool {
        self.layer(node).map(|l| l.renderable).unwrap_or(false)
    }

    fn frame_range(&self) -> FrameRange {
        self.frame_range
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn layer_frame_range(&self, node: &str) -> FrameRange {
        self.layer(node)
            .and_then(|l| l.frame_range)
            .unwrap_or(self.frame_range)
    }

    fn layer_resolution(&self, node: &str) -> Resolution {
        self.layer(node)
            .and_then(|l| l.resolution)
            .unwrap_or(self.resolution)
    }

    fn cameras(&self) -> Vec<String> {
        self.cameras.iter().map(|c| c.name.clone()).collect()
    }

    fn set_camera_renderable(&mut self, camera: &str, renderable: bool) -> bool {
        match self.cameras.iter_mut().find(|c| c.name == camera) {
            Some(cam) if cam.renderable.is_some() => {
                cam.renderable = Some(renderable);
                true
            }
            _ => false,
        }
    }

    fn select_camera(&mut self, camera: &str) {
        self.selected_camera = Some(camera.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCENE: &str = r#"
scene_path: /jobs/show/shot010/scenes/shot010_lighting.mb
workspace: /jobs/show/shot010
resolution: { width: 1920, height: 1080 }
frame_range: [1, 100]
layers:
  - name: defaultRenderLayer
    renderable: false
  - name: rs_beauty
    frame_range: [1, 50]
  - name: rs_fx
    referenced: true
    resolution: { width: 960, height: 540 }
cameras:
  - name: persp
    renderable: true
  - name: shotCam_main
    renderable: false
  - name: top
"#;

    #[test]
    fn test_parse_snapshot() {
        let scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
        assert_eq!(scene.scene_file_name(), "shot010_lighting.mb");
        assert_eq!(
            scene.render_layer_nodes(),
            vec!["defaultRenderLayer", "rs_beauty", "rs_fx"]
        );
        assert!(scene.renderable_flag("rs_beauty"));
        assert!(!scene.is_layer_renderable("defaultRenderLayer"));
        assert!(!scene.is_layer_renderable("rs_fx"));
    }

    #[test]
    fn test_per_layer_overrides() {
        let scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
        assert_eq!(scene.layer_frame_range("rs_beauty"), FrameRange::new(1, 50));
        assert_eq!(scene.layer_frame_range("rs_fx"), FrameRange::new(1, 100));
        assert_eq!(scene.layer_resolution("rs_fx"), Resolution::new(960, 540));
        assert_eq!(
            scene.layer_resolution("rs_beauty"),
            Resolution::new(1920, 1080)
        );
    }

    #[test]
    fn test_camera_without_renderable_attr() {
        let mut scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
        assert!(!scene.set_camera_renderable("top", true));
        assert!(scene.set_camera_renderable("persp", false));
        assert_eq!(scene.camera_renderable("persp"), Some(false));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = SceneSnapshot::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        std::fs::write(&path, SCENE).unwrap();
        let scene = SceneSnapshot::load(&path).unwrap();
        assert_eq!(scene.workspace(), "/jobs/show/shot010");
    }
}
