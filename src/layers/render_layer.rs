//! Render layer rows
//!
//! A `RenderLayer` is one row of the layer tree: the layer state read from
//! the scene plus the user's edits (checked, expanded, overrides).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scene::{FrameRange, Resolution};

/// One render layer as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLayer {
    /// Display name (internal prefix stripped).
    pub name: String,

    pub is_default: bool,

    /// Raw renderable flag from the scene.
    pub renderable: bool,

    pub referenced: bool,

    pub frame_range: FrameRange,

    pub width: u32,

    pub height: u32,

    /// Whether a step is emitted for this layer.
    pub checked: bool,

    pub expanded: bool,

    /// Text typed into the frame-range leaf, if the user edited it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_range_override: Option<String>,
}

impl RenderLayer {
    /// Create an unchecked, collapsed layer row.
    pub fn new(name: impl Into<String>, frame_range: FrameRange, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            renderable: false,
            referenced: false,
            frame_range,
            width: resolution.width,
            height: resolution.height,
            checked: false,
            expanded: false,
            frame_range_override: None,
        }
    }

    /// Builder-style checked flag.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Text shown in the frame-range leaf.
    pub fn frame_range_text(&self) -> String {
        match &self.frame_range_override {
            Some(text) => text.clone(),
            None => self.frame_range.to_string(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// The fixed tree shape of this row.
    pub fn row(&self) -> LayerRow {
        LayerRow {
            name: self.name.clone(),
            checked: self.checked,
            expanded: self.expanded,
            size: SizeNode {
                width: self.width.to_string(),
                height: self.height.to_string(),
            },
            frame_range: self.frame_range_text(),
        }
    }
}

/// Size node of a layer row, with editable width and height leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeNode {
    pub width: String,
    pub height: String,
}

/// A layer row: a size node and a frame-range leaf under the layer name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerRow {
    pub name: String,
    pub checked: bool,
    pub expanded: bool,
    pub size: SizeNode,
    pub frame_range: String,
}

impl fmt::Display for LayerRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.checked { "[x]" } else { "[ ]" };
        writeln!(f, "{} {}", mark, self.name)?;
        if !self.expanded {
            return Ok(());
        }
        writeln!(f, "    size")?;
        writeln!(f, "        width        {}", self.size.width)?;
        writeln!(f, "        height       {}", self.size.height)?;
        writeln!(f, "    frame range      {}", self.frame_range)
    }
}
