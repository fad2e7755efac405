//! In-memory farm collaborators
//!
//! Used by tests and by dry runs that must not reach a real farm.

use std::cell::RefCell;

use super::model::{FarmDirectory, FarmInfo, FleetAttribute, JobSubmitter, QueueInfo, SubmitRequest};

/// A farm directory with fixed contents.
#[derive(Debug, Clone, Default)]
pub struct StaticFarmDirectory {
    farms: Vec<FarmInfo>,
    queues: Vec<(String, QueueInfo)>,
    fleet_attributes: Vec<(String, FleetAttribute)>,
}

impl StaticFarmDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_farm(mut self, farm_id: &str, display_name: &str) -> Self {
        self.farms.push(FarmInfo {
            farm_id: farm_id.to_string(),
            display_name: display_name.to_string(),
        });
        self
    }

    pub fn with_queue(mut self, farm_id: &str, queue_id: &str, display_name: &str) -> Self {
        self.queues.push((
            farm_id.to_string(),
            QueueInfo {
                queue_id: queue_id.to_string(),
                display_name: display_name.to_string(),
            },
        ));
        self
    }

    pub fn with_fleet_attribute(mut self, farm_id: &str, name: &str, value: &str) -> Self {
        self.fleet_attributes.push((
            farm_id.to_string(),
            FleetAttribute {
                attr_name: name.to_string(),
                attr_value: value.to_string(),
            },
        ));
        self
    }
}

impl FarmDirectory for StaticFarmDirectory {
    fn list_farms(&self) -> Vec<FarmInfo> {
        self.farms.clone()
    }

    fn list_queues(&self, farm_id: &str) -> Vec<QueueInfo> {
        self.queues
            .iter()
            .filter(|(farm, _)| farm == farm_id)
            .map(|(_, queue)| queue.clone())
            .collect()
    }

    fn list_fleet_attributes(&self, farm_id: &str) -> Vec<FleetAttribute> {
        self.fleet_attributes
            .iter()
            .filter(|(farm, _)| farm == farm_id)
            .map(|(_, attr)| attr.clone())
            .collect()
    }
}

/// Records submissions and answers with a fixed status text.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    status: String,
    requests: RefCell<Vec<SubmitRequest>>,
}

impl RecordingSubmitter {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SubmitRequest> {
        self.requests.borrow().clone()
    }
}

impl JobSubmitter for RecordingSubmitter {
    fn submit(&self, request: &SubmitRequest) -> String {
        self.requests.borrow_mut().push(request.clone());
        self.status.clone()
    }
}
