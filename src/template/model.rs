//! Job template document schema
//!
//! Only the fields the synthesizer touches are typed. Everything else in a
//! document is kept in the `extra` maps so that a read/write cycle does not
//! drop keys this crate does not know about.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{LayerJobError, Result};

/// Top-level `template.yaml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub steps: Vec<StepTemplate>,

    /// Unknown fields preserved for round trips.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl JobTemplate {
    /// The step every emitted step is cloned from.
    pub fn prototype_step(&self) -> Result<&StepTemplate> {
        self.steps.first().ok_or_else(|| LayerJobError::InvalidTemplate {
            reason: "template has no steps to use as a prototype".to_string(),
        })
    }
}

/// One step of a job template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTemplate {
    #[serde(default)]
    pub name: String,

    #[serde(
        rename = "parameterSpace",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_space: Option<ParameterSpace>,

    #[serde(
        rename = "stepEnvironments",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub step_environments: Vec<StepEnvironment>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl StepTemplate {
    /// Task parameter definition at a fixed position.
    pub fn task_parameter_mut(&mut self, index: usize) -> Result<&mut TaskParameterDefinition> {
        let step = self.name.clone();
        self.parameter_space
            .as_mut()
            .and_then(|space| space.task_parameter_definitions.get_mut(index))
            .ok_or_else(|| LayerJobError::InvalidTemplate {
                reason: format!("step '{}' has no task parameter definition {}", step, index),
            })
    }

    /// The embedded script of the first step environment.
    pub fn embedded_script_mut(&mut self) -> Result<&mut EmbeddedFile> {
        let step = self.name.clone();
        self.step_environments
            .first_mut()
            .and_then(|env| env.script.as_mut())
            .and_then(|script| script.embedded_files.first_mut())
            .ok_or_else(|| LayerJobError::InvalidTemplate {
                reason: format!("step '{}' has no embedded script file", step),
            })
    }

    pub fn task_parameter(&self, index: usize) -> Option<&TaskParameterDefinition> {
        self.parameter_space
            .as_ref()
            .and_then(|space| space.task_parameter_definitions.get(index))
    }

    pub fn embedded_script(&self) -> Option<&EmbeddedFile> {
        self.step_environments
            .first()
            .and_then(|env| env.script.as_ref())
            .and_then(|script| script.embedded_files.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    #[serde(rename = "taskParameterDefinitions", default)]
    pub task_parameter_definitions: Vec<TaskParameterDefinition>,

    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskParameterDefinition {
    #[serde(default)]
    pub name: String,

    pub range: TaskRange,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// A task parameter range: either an expression (`1-100`) or explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskRange {
    Expression(String),
    Values(Vec<Value>),
}

impl TaskRange {
    /// A list of string values.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TaskRange::Values(values.into_iter().map(|v| Value::String(v.into())).collect())
    }

    pub fn as_expression(&self) -> Option<&str> {
        match self {
            TaskRange::Expression(text) => Some(text),
            TaskRange::Values(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEnvironment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<EnvironmentScript>,

    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentScript {
    #[serde(rename = "embeddedFiles", default)]
    pub embedded_files: Vec<EmbeddedFile>,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// A script file carried inside the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedFile {
    #[serde(default)]
    pub data: String,

    #[serde(flatten)]
    pub extra: Mapping,
}
