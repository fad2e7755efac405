//! Submitter configuration
//!
//! Loaded from an optional YAML file; every field has a default so an empty
//! or missing file is valid. A few settings can be overridden from the
//! environment:
//!
//! | Env Var                 | Overrides          |
//! |-------------------------|--------------------|
//! | `LAYERJOB_DEADLINE`     | `deadline_command` |
//! | `LAYERJOB_TEMPLATE_DIR` | `template_dir`     |

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LayerJobError, Result};

/// Environment variable overriding the farm CLI executable.
pub const DEADLINE_ENV: &str = "LAYERJOB_DEADLINE";

/// Environment variable overriding the job bundle directory.
pub const TEMPLATE_DIR_ENV: &str = "LAYERJOB_TEMPLATE_DIR";

/// Farm, queue and fleet attribute picked when nothing else is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmDefaults {
    /// Display name of the farm selected on startup.
    pub default_farm_display_name: Option<String>,

    /// Farm id used when the farm list is unavailable.
    pub default_farm_id: Option<String>,

    /// Queue display name selected on the default farm.
    pub default_queue: Option<String>,

    /// Fleet attribute value selected on the default farm.
    pub default_fleet_attr: Option<String>,
}

/// Job submission defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub priority: u32,
    /// Failed tasks allowed before the job fails.
    pub job_retries: u32,
    /// Retries per task.
    pub task_retries: u32,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            priority: 50,
            job_retries: 20,
            task_retries: 5,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Farm CLI executable.
    pub deadline_command: String,

    /// Job bundle directory holding `template.yaml`.
    pub template_dir: Option<PathBuf>,

    /// Render output directory, relative to the project workspace.
    pub output_subdir: String,

    pub farm: FarmDefaults,

    pub job: JobDefaults,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            deadline_command: "deadline".to_string(),
            template_dir: None,
            output_subdir: "maya/images".to_string(),
            farm: FarmDefaults::default(),
            job: JobDefaults::default(),
        }
    }
}

impl SubmitterConfig {
    /// Load from `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                if !path.exists() {
                    return Err(LayerJobError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                let content =
                    fs::read_to_string(path).map_err(|e| LayerJobError::FileReadError {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                if content.trim().is_empty() {
                    Self::default()
                } else {
                    serde_yaml::from_str(&content)?
                }
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cmd) = lookup(DEADLINE_ENV).filter(|v| !v.is_empty()) {
            self.deadline_command = cmd;
        }
        if let Some(dir) = lookup(TEMPLATE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.template_dir = Some(PathBuf::from(dir));
        }
    }

    /// Output directory for a project workspace.
    pub fn output_path(&self, workspace: &str) -> String {
        format!(
            "{}/{}",
            workspace.trim_end_matches(|c: char| c == '/' || c == '\\'),
            self.output_subdir
        )
    }
}
