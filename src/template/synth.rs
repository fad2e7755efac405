//! Template step synthesis
//!
//! Expands the prototype step of a job template into one step per checked
//! render layer.

use log::{debug, info};

use super::model::{JobTemplate, StepTemplate, TaskRange};
use super::patch::{patch_fields, ScriptField};
use crate::error::Result;
use crate::layers::RenderLayer;

/// Task parameter holding the frame range.
pub const FRAME_RANGE_PARAM_INDEX: usize = 0;

/// Task parameter holding the render camera list.
pub const CAMERA_PARAM_INDEX: usize = 1;

/// Clones a prototype step once per checked layer.
#[derive(Debug, Clone)]
pub struct TemplateStepSynthesizer {
    prototype: StepTemplate,
}

impl TemplateStepSynthesizer {
    pub fn new(prototype: StepTemplate) -> Self {
        Self { prototype }
    }

    /// Use the first step of a template as the prototype.
    pub fn from_template(template: &JobTemplate) -> Result<Self> {
        Ok(Self::new(template.prototype_step()?.clone()))
    }

    pub fn prototype(&self) -> &StepTemplate {
        &self.prototype
    }

    /// Build the steps for the checked layers, in layer order.
    ///
    /// `frame_override`, when given, replaces every layer's own frame range.
    /// `render_camera` is written as a one-element list even when empty.
    pub fn synthesize(
        &self,
        layers: &[RenderLayer],
        render_camera: &str,
        frame_override: Option<&str>,
    ) -> Result<Vec<StepTemplate>> {
        // one clone per row, checked or not
        let mut clones = vec![self.prototype.clone(); layers.len()].into_iter();
        let mut steps = Vec::new();

        for layer in layers.iter().filter(|l| l.checked) {
            let Some(mut step) = clones.next() else {
                break;
            };

            let frame_range = match frame_override {
                Some(text) => text.to_string(),
                None => layer.frame_range_text(),
            };

            step.name = layer.name.clone();
            step.task_parameter_mut(FRAME_RANGE_PARAM_INDEX)?.range =
                TaskRange::Expression(frame_range.clone());
            step.task_parameter_mut(CAMERA_PARAM_INDEX)?.range =
                TaskRange::values([render_camera]);

            let width = layer.width.to_string();
            let height = layer.height.to_string();
            let script = step.embedded_script_mut()?;
            script.data = patch_fields(
                &script.data,
                &[
                    (ScriptField::RenderLayer, layer.name.as_str()),
                    (ScriptField::ImageWidth, width.as_str()),
                    (ScriptField::ImageHeight, height.as_str()),
                ],
            )?;

            debug!(
                "Step '{}': frames {}, {}x{}, camera '{}'",
                step.name, frame_range, width, height, render_camera
            );
            steps.push(step);
        }

        Ok(steps)
    }

    /// Replace the steps of `template` with synthesized ones and name the job.
    pub fn synthesize_job(
        &self,
        mut template: JobTemplate,
        layers: &[RenderLayer],
        render_camera: &str,
        frame_override: Option<&str>,
        job_name: &str,
    ) -> Result<JobTemplate> {
        let steps = self.synthesize(layers, render_camera, frame_override)?;
        info!("Synthesized {} step(s) for job '{}'", steps.len(), job_name);

        template.name = job_name.to_string();
        template.steps = steps;
        Ok(template)
    }
}
