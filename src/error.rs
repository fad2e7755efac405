//! Error handling for layerjob
//!
//! Synthesis errors are always raised before any document is written, so a
//! failed submit never leaves a half-updated template directory behind.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for layerjob operations
pub type Result<T> = std::result::Result<T, LayerJobError>;

/// Main error type for layerjob operations
#[derive(Error, Debug)]
pub enum LayerJobError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Template Errors
    #[error("Cannot patch '{field}' in embedded script: {reason}")]
    Patch { field: String, reason: String },

    #[error("Parameter index {index} out of range (document has {len} entries, need at least {required})")]
    OutOfRange {
        index: usize,
        len: usize,
        required: usize,
    },

    #[error("Invalid job template: {reason}")]
    InvalidTemplate { reason: String },

    // Layer Errors
    #[error("Render layer not found: {name}")]
    LayerNotFound { name: String },

    #[error("Invalid frame range: {text}")]
    InvalidFrameRange { text: String },

    // Session Errors
    #[error("A submission is already in progress")]
    SubmitInProgress,

    #[error("A submitter session is already open: {session_id}")]
    SessionActive { session_id: String },

    #[error("Farm query failed: {reason}")]
    FarmQuery { reason: String },

    #[error("Submit command failed: {reason}")]
    SubmitFailed { reason: String },

    // Splice Errors
    #[error("Queue environment splice failed: {reason}")]
    Splice { reason: String },

    // Serialization Errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerJobError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LayerJobError::FileNotFound { .. } => "FILE_NOT_FOUND",
            LayerJobError::FileReadError { .. } => "FILE_READ_ERROR",
            LayerJobError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            LayerJobError::Patch { .. } => "PATCH_ERROR",
            LayerJobError::OutOfRange { .. } => "OUT_OF_RANGE",
            LayerJobError::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            LayerJobError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            LayerJobError::InvalidFrameRange { .. } => "INVALID_FRAME_RANGE",
            LayerJobError::SubmitInProgress => "SUBMIT_IN_PROGRESS",
            LayerJobError::SessionActive { .. } => "SESSION_ACTIVE",
            LayerJobError::FarmQuery { .. } => "FARM_QUERY_FAILED",
            LayerJobError::SubmitFailed { .. } => "SUBMIT_FAILED",
            LayerJobError::Splice { .. } => "SPLICE_ERROR",
            LayerJobError::Yaml(_) => "YAML_ERROR",
            LayerJobError::Json(_) => "JSON_ERROR",
            LayerJobError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if the user can fix this error and try the same action again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LayerJobError::FileNotFound { .. }
                | LayerJobError::LayerNotFound { .. }
                | LayerJobError::InvalidFrameRange { .. }
                | LayerJobError::SubmitInProgress
                | LayerJobError::SessionActive { .. }
                | LayerJobError::FarmQuery { .. }
                | LayerJobError::SubmitFailed { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            LayerJobError::FileNotFound { .. } => Some("Check the file path and try again."),
            LayerJobError::Patch { .. } => Some(
                "The step's embedded script must contain render_layer, image_width and image_height lines.",
            ),
            LayerJobError::OutOfRange { .. } => {
                Some("parameter_values.yaml must list at least 15 parameter values.")
            }
            LayerJobError::LayerNotFound { .. } => {
                Some("Run 'layerjob layers' to see the layers in the scene.")
            }
            LayerJobError::SubmitInProgress => {
                Some("Wait for the previous submission to finish.")
            }
            LayerJobError::SessionActive { .. } => {
                Some("Release the open session before opening a new one.")
            }
            LayerJobError::SubmitFailed { .. } => {
                Some("Check that the deadline CLI is installed and you are logged in.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LayerJobError::Patch {
            field: "render_layer".to_string(),
            reason: "field line not found".to_string(),
        };
        assert_eq!(err.error_code(), "PATCH_ERROR");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = LayerJobError::OutOfRange {
            index: 14,
            len: 3,
            required: 15,
        };
        assert!(err.to_string().contains("14"));
        assert!(err.recovery_suggestion().is_some());
    }
}
