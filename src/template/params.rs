//! Parameter value binding
//!
//! `parameter_values.yaml` is an ordered list addressed by position. The
//! submitter owns eight of its slots; the remaining ones (2 and 7 through 12)
//! belong to other tools and are left as they are.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{LayerJobError, Result};

/// Minimum number of entries a parameter document must carry.
pub const REQUIRED_PARAMETER_COUNT: usize = 15;

/// `parameter_values.yaml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValues {
    #[serde(rename = "parameterValues", default)]
    pub parameter_values: Vec<ParameterValue>,

    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub value: Value,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// The slots written by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSlot {
    ScenePath,
    FrameRange,
    ImageWidth,
    ImageHeight,
    ProjectPath,
    OutputPath,
    FleetAttrValue,
    FleetAttrDisplay,
}

impl ParameterSlot {
    pub const ALL: [ParameterSlot; 8] = [
        ParameterSlot::ScenePath,
        ParameterSlot::FrameRange,
        ParameterSlot::ImageWidth,
        ParameterSlot::ImageHeight,
        ParameterSlot::ProjectPath,
        ParameterSlot::OutputPath,
        ParameterSlot::FleetAttrValue,
        ParameterSlot::FleetAttrDisplay,
    ];

    /// Position in legacy documents.
    pub fn index(&self) -> usize {
        match self {
            ParameterSlot::ScenePath => 0,
            ParameterSlot::FrameRange => 1,
            ParameterSlot::ImageWidth => 3,
            ParameterSlot::ImageHeight => 4,
            ParameterSlot::ProjectPath => 5,
            ParameterSlot::OutputPath => 6,
            ParameterSlot::FleetAttrValue => 13,
            ParameterSlot::FleetAttrDisplay => 14,
        }
    }

    /// Parameter name expected at this slot.
    pub fn parameter_name(&self) -> &'static str {
        match self {
            ParameterSlot::ScenePath => "MayaSceneFile",
            ParameterSlot::FrameRange => "Frames",
            ParameterSlot::ImageWidth => "ImageWidth",
            ParameterSlot::ImageHeight => "ImageHeight",
            ParameterSlot::ProjectPath => "ProjectPath",
            ParameterSlot::OutputPath => "OutputFilePath",
            ParameterSlot::FleetAttrValue => "FleetAttributeValue",
            ParameterSlot::FleetAttrDisplay => "FleetAttributeName",
        }
    }
}

/// Values the submitter owns in the parameter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindValues {
    pub scene_path: String,
    pub frame_range_text: String,
    pub width: u32,
    pub height: u32,
    pub project_path: String,
    pub output_path: String,
    /// `None` when no fleet attribute is selected.
    pub fleet_attr_value: Option<String>,
    pub fleet_attr_display: String,
}

impl BindValues {
    fn value_for(&self, slot: ParameterSlot) -> Value {
        match slot {
            ParameterSlot::ScenePath => Value::String(self.scene_path.clone()),
            ParameterSlot::FrameRange => Value::String(self.frame_range_text.clone()),
            ParameterSlot::ImageWidth => Value::Number(self.width.into()),
            ParameterSlot::ImageHeight => Value::Number(self.height.into()),
            ParameterSlot::ProjectPath => Value::String(self.project_path.clone()),
            ParameterSlot::OutputPath => Value::String(self.output_path.clone()),
            ParameterSlot::FleetAttrValue => self
                .fleet_attr_value
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
            ParameterSlot::FleetAttrDisplay => Value::String(self.fleet_attr_display.clone()),
        }
    }
}

impl ParameterValues {
    /// Entry for a slot, if the document is long enough.
    pub fn slot(&self, slot: ParameterSlot) -> Option<&ParameterValue> {
        self.parameter_values.get(slot.index())
    }

    /// Slots whose entry carries a name other than the expected one.
    pub fn schema_mismatches(&self) -> Vec<(ParameterSlot, String)> {
        ParameterSlot::ALL
            .iter()
            .filter_map(|slot| {
                let name = self.slot(*slot)?.name.as_ref()?;
                (name != slot.parameter_name()).then(|| (*slot, name.clone()))
            })
            .collect()
    }

    /// Write the submitter's values into their fixed positions.
    ///
    /// The document is left untouched when it is too short.
    pub fn bind(&mut self, values: &BindValues) -> Result<()> {
        let len = self.parameter_values.len();
        if len < REQUIRED_PARAMETER_COUNT {
            return Err(LayerJobError::OutOfRange {
                index: REQUIRED_PARAMETER_COUNT - 1,
                len,
                required: REQUIRED_PARAMETER_COUNT,
            });
        }

        for (slot, name) in self.schema_mismatches() {
            warn!(
                "Parameter {} is named '{}', expected '{}'; binding by position",
                slot.index(),
                name,
                slot.parameter_name()
            );
        }

        for slot in ParameterSlot::ALL {
            self.parameter_values[slot.index()].value = values.value_for(slot);
        }

        Ok(())
    }
}
