//! Job form values
//!
//! The editable fields of the submitter form, seeded from the scene and the
//! configuration when a session opens.

use serde::{Deserialize, Serialize};

use crate::config::SubmitterConfig;
use crate::farm::FleetAttribute;
use crate::scene::SceneStateProvider;
use crate::template::BindValues;

/// Job-level settings for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Job name shown on the form. The template itself is always named
    /// after the scene file.
    pub job_name: String,

    pub scene_path: String,

    pub project_path: String,

    pub output_path: String,

    /// Global frame range text (`start-end`).
    pub frame_range_text: String,

    /// Use `frame_range_text` for every step instead of each layer's range.
    pub frames_override: bool,

    pub width: u32,

    pub height: u32,

    pub priority: u32,

    pub job_retries: u32,

    pub task_retries: u32,
}

impl JobSettings {
    /// Seed the form from the scene's render settings.
    pub fn from_scene<S: SceneStateProvider + ?Sized>(scene: &S, config: &SubmitterConfig) -> Self {
        let resolution = scene.resolution();
        Self {
            job_name: scene.scene_file_name(),
            scene_path: scene.scene_path().to_string(),
            project_path: scene.workspace().to_string(),
            output_path: config.output_path(scene.workspace()),
            frame_range_text: scene.frame_range().to_string(),
            frames_override: false,
            width: resolution.width,
            height: resolution.height,
            priority: config.job.priority,
            job_retries: config.job.job_retries,
            task_retries: config.job.task_retries,
        }
    }

    /// Frame text applied to every step, if the override is on.
    pub fn frame_override(&self) -> Option<&str> {
        self.frames_override
            .then_some(self.frame_range_text.as_str())
    }

    /// Parameter document values for these settings.
    pub fn bind_values(&self, fleet_attribute: Option<&FleetAttribute>) -> BindValues {
        BindValues {
            scene_path: self.scene_path.clone(),
            frame_range_text: self.frame_range_text.clone(),
            width: self.width,
            height: self.height,
            project_path: self.project_path.clone(),
            output_path: self.output_path.clone(),
            fleet_attr_value: fleet_attribute.map(|a| a.attr_name.clone()),
            fleet_attr_display: fleet_attribute
                .map(|a| a.attr_value.clone())
                .unwrap_or_default(),
        }
    }
}
