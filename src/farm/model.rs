//! Farm collaborator traits and core types
//!
//! Listing calls never fail: a farm service that cannot be reached looks the
//! same as one with nothing in it. Submission returns the submit tool's text
//! output; the only thing callers look for in it is the proceed prompt.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text the submit tool prints when it wants the user to confirm.
pub const PROCEED_PROMPT: &str = "Do you wish to proceed?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmInfo {
    pub farm_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub queue_id: String,
    pub display_name: String,
}

/// A worker capability attribute of a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetAttribute {
    /// Attribute name (`attr.worker.gpu`).
    pub attr_name: String,
    /// First value of the attribute, shown to the user.
    pub attr_value: String,
}

/// Lists farms, queues and fleet attributes.
pub trait FarmDirectory {
    fn list_farms(&self) -> Vec<FarmInfo>;

    fn list_queues(&self, farm_id: &str) -> Vec<QueueInfo>;

    fn list_fleet_attributes(&self, farm_id: &str) -> Vec<FleetAttribute>;
}

/// Arguments of one bundle submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    pub priority: u32,
    pub job_retries: u32,
    pub task_retries: u32,
    pub template_dir: PathBuf,
    pub farm_id: String,
    pub queue_id: String,
}

/// Submits a job bundle directory.
pub trait JobSubmitter {
    /// Run the submission and return its status text. Failures to run the
    /// tool are reported in the text as well.
    fn submit(&self, request: &SubmitRequest) -> String;
}

/// Whether a status text asks the user to confirm the submission.
pub fn needs_confirmation(status: &str) -> bool {
    status.contains(PROCEED_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_confirmation() {
        assert!(needs_confirmation(
            "Job attachments exceed 1 GB.\nDo you wish to proceed? [y/N]"
        ));
        assert!(!needs_confirmation("Submitted job bundle: job-1234"));
    }
}
