//! Job bundle document I/O
//!
//! A job bundle directory holds `template.yaml` and `parameter_values.yaml`.
//! Documents are fully serialized before anything touches the disk, and each
//! file is replaced in one rename so readers never see a partial write.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model::JobTemplate;
use super::params::ParameterValues;
use crate::error::{LayerJobError, Result};

/// Job template file name inside a bundle.
pub const TEMPLATE_FILE: &str = "template.yaml";

/// Parameter values file name inside a bundle.
pub const PARAMETER_VALUES_FILE: &str = "parameter_values.yaml";

/// Read and parse a YAML document.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(LayerJobError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| LayerJobError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(serde_yaml::from_str(&content)?)
}

/// Replace a file's content through a sibling temp file and a rename.
pub fn replace_file(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, content).map_err(|e| LayerJobError::FileWriteError {
        path: tmp_path.clone(),
        source: e,
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        LayerJobError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// Serialize a document to YAML text.
///
/// serde_yaml writes repeated structures out in full; it never emits
/// anchors or aliases.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// A job bundle directory.
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    dir: PathBuf,
}

impl TemplateBundle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn template_path(&self) -> PathBuf {
        self.dir.join(TEMPLATE_FILE)
    }

    pub fn parameter_values_path(&self) -> PathBuf {
        self.dir.join(PARAMETER_VALUES_FILE)
    }

    pub fn read_template(&self) -> Result<JobTemplate> {
        read_yaml(&self.template_path())
    }

    pub fn read_parameter_values(&self) -> Result<ParameterValues> {
        read_yaml(&self.parameter_values_path())
    }

    /// Write both documents. Nothing is written if either fails to serialize.
    pub fn write_documents(&self, template: &JobTemplate, params: &ParameterValues) -> Result<()> {
        let params_text = to_yaml(params)?;
        let template_text = to_yaml(template)?;

        replace_file(&self.parameter_values_path(), &params_text)?;
        replace_file(&self.template_path(), &template_text)?;
        Ok(())
    }
}
