//! Job template synthesis
//!
//! This module provides:
//! - The `template.yaml` / `parameter_values.yaml` document model
//! - Embedded script patching
//! - Positional parameter binding
//! - Per-layer step synthesis
//! - Bundle reading and writing

pub mod io;
mod model;
mod params;
mod patch;
mod synth;

pub use io::{TemplateBundle, PARAMETER_VALUES_FILE, TEMPLATE_FILE};
pub use model::{
    EmbeddedFile, EnvironmentScript, JobTemplate, ParameterSpace, StepEnvironment, StepTemplate,
    TaskParameterDefinition, TaskRange,
};
pub use params::{BindValues, ParameterSlot, ParameterValue, ParameterValues, REQUIRED_PARAMETER_COUNT};
pub use patch::{field_value, patch, patch_fields, ScriptField};
pub use synth::{TemplateStepSynthesizer, CAMERA_PARAM_INDEX, FRAME_RANGE_PARAM_INDEX};
