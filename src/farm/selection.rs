//! Farm, queue and fleet attribute selection
//!
//! Mirrors the submitter's three linked pickers: choosing a farm reloads its
//! queues and fleet attributes, and the configured defaults are applied when
//! the chosen farm is the default farm.

use log::{info, warn};

use super::model::{FarmDirectory, FarmInfo, FleetAttribute, QueueInfo};
use crate::config::FarmDefaults;

/// Current farm, queue and fleet attribute choice.
#[derive(Debug, Clone, Default)]
pub struct FarmSelection {
    farms: Vec<FarmInfo>,
    queues: Vec<QueueInfo>,
    fleet_attributes: Vec<FleetAttribute>,
    farm: Option<usize>,
    queue: Option<usize>,
    fleet_attribute: Option<usize>,
}

impl FarmSelection {
    /// List farms and select the default one.
    pub fn load<D: FarmDirectory + ?Sized>(directory: &D, defaults: &FarmDefaults) -> Self {
        let mut selection = Self {
            farms: directory.list_farms(),
            ..Self::default()
        };

        if selection.farms.is_empty() {
            warn!("No farm found");
            return selection;
        }

        let default_index = defaults
            .default_farm_display_name
            .as_deref()
            .and_then(|name| selection.farms.iter().position(|f| f.display_name == name))
            .or_else(|| {
                defaults
                    .default_farm_id
                    .as_deref()
                    .and_then(|id| selection.farms.iter().position(|f| f.farm_id == id))
            });

        if let Some(index) = default_index {
            selection.select_farm_index(directory, index, defaults);
        }
        selection
    }

    pub fn farms(&self) -> &[FarmInfo] {
        &self.farms
    }

    pub fn queues(&self) -> &[QueueInfo] {
        &self.queues
    }

    pub fn fleet_attributes(&self) -> &[FleetAttribute] {
        &self.fleet_attributes
    }

    pub fn farm(&self) -> Option<&FarmInfo> {
        self.farm.and_then(|i| self.farms.get(i))
    }

    pub fn queue(&self) -> Option<&QueueInfo> {
        self.queue.and_then(|i| self.queues.get(i))
    }

    pub fn fleet_attribute(&self) -> Option<&FleetAttribute> {
        self.fleet_attribute.and_then(|i| self.fleet_attributes.get(i))
    }

    /// Select a farm by id. Returns false if the farm is not listed.
    pub fn select_farm<D: FarmDirectory + ?Sized>(
        &mut self,
        directory: &D,
        farm_id: &str,
        defaults: &FarmDefaults,
    ) -> bool {
        match self.farms.iter().position(|f| f.farm_id == farm_id) {
            Some(index) => {
                self.select_farm_index(directory, index, defaults);
                true
            }
            None => false,
        }
    }

    fn select_farm_index<D: FarmDirectory + ?Sized>(
        &mut self,
        directory: &D,
        index: usize,
        defaults: &FarmDefaults,
    ) {
        self.farm = Some(index);
        let farm_id = self.farms[index].farm_id.clone();

        // queues belong to one farm; never carry them across a switch
        self.queues = directory.list_queues(&farm_id);
        self.queue = if self.queues.is_empty() { None } else { Some(0) };

        self.fleet_attributes = directory.list_fleet_attributes(&farm_id);
        self.fleet_attribute = if self.fleet_attributes.is_empty() {
            None
        } else {
            Some(0)
        };

        self.apply_defaults(defaults);
        info!(
            "Farm '{}': {} queue(s), {} fleet attribute(s)",
            self.farms[index].display_name,
            self.queues.len(),
            self.fleet_attributes.len()
        );
    }

    /// On the default farm, select the default queue and fleet attribute.
    pub fn apply_defaults(&mut self, defaults: &FarmDefaults) {
        let on_default_farm = match (self.farm(), defaults.default_farm_display_name.as_deref()) {
            (Some(farm), Some(name)) => farm.display_name == name,
            _ => false,
        };
        if !on_default_farm {
            return;
        }

        if let Some(queue) = defaults.default_queue.as_deref() {
            self.queue = self.queues.iter().position(|q| q.display_name == queue);
        }
        if let Some(attr) = defaults.default_fleet_attr.as_deref() {
            self.fleet_attribute = self
                .fleet_attributes
                .iter()
                .position(|a| a.attr_value == attr);
        }
    }

    /// Select a queue by id or display name.
    pub fn select_queue(&mut self, queue: &str) -> bool {
        match self
            .queues
            .iter()
            .position(|q| q.queue_id == queue || q.display_name == queue)
        {
            Some(index) => {
                self.queue = Some(index);
                true
            }
            None => false,
        }
    }

    /// Select a fleet attribute by its displayed value.
    pub fn select_fleet_attribute(&mut self, value: &str) -> bool {
        match self.fleet_attributes.iter().position(|a| a.attr_value == value) {
            Some(index) => {
                self.fleet_attribute = Some(index);
                true
            }
            None => false,
        }
    }
}
