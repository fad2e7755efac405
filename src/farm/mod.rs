//! Render farm collaborators
//!
//! This module provides:
//! - `FarmDirectory` and `JobSubmitter` traits
//! - The `deadline` CLI implementation of both
//! - Farm/queue/fleet attribute selection with configured defaults
//! - In-memory implementations for testing

mod deadline;
pub mod mock;
mod model;
mod selection;

pub use deadline::{parse_farms, parse_fleet_attributes, parse_queues, DeadlineCli};
pub use model::{
    needs_confirmation, FarmDirectory, FarmInfo, FleetAttribute, JobSubmitter, QueueInfo,
    SubmitRequest, PROCEED_PROMPT,
};
pub use selection::FarmSelection;
