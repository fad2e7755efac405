//! Layer selection model
//!
//! Holds the layer rows for one submit session. Mutators only touch the
//! in-memory rows; the scene is read on `refresh` and never written.

use log::debug;

use super::render_layer::{LayerRow, RenderLayer};
use crate::error::{LayerJobError, Result};
use crate::scene::{layer_display_name, SceneStateProvider, DEFAULT_LAYER_NAME};

/// Checked/expanded state and overrides for every render layer row.
#[derive(Debug, Clone, Default)]
pub struct LayerSelectionModel {
    layers: Vec<RenderLayer>,
}

impl LayerSelectionModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Create a model from explicit rows.
    pub fn from_layers(layers: Vec<RenderLayer>) -> Self {
        Self { layers }
    }

    /// Build the model from the scene's current layers.
    pub fn from_scene<S: SceneStateProvider + ?Sized>(scene: &S) -> Self {
        let mut model = Self::new();
        model.refresh(scene);
        model
    }

    /// Enumerate the scene's render layers.
    ///
    /// With `test_renderable`, only layers that are renderable and not
    /// referenced are returned; otherwise every layer that is not referenced.
    /// Display names have the internal node prefix stripped. Returned rows
    /// are checked (and expanded) when the layer is renderable.
    pub fn list_non_default_layers<S: SceneStateProvider + ?Sized>(
        scene: &S,
        test_renderable: bool,
    ) -> Vec<RenderLayer> {
        scene
            .render_layer_nodes()
            .into_iter()
            .filter(|node| {
                if test_renderable {
                    scene.is_layer_renderable(node)
                } else {
                    !scene.is_referenced(node)
                }
            })
            .map(|node| {
                let resolution = scene.layer_resolution(&node);
                let renderable = scene.is_layer_renderable(&node);

                let mut layer = RenderLayer::new(
                    layer_display_name(&node),
                    scene.layer_frame_range(&node),
                    resolution,
                );
                layer.is_default = node == DEFAULT_LAYER_NAME;
                layer.renderable = scene.renderable_flag(&node);
                layer.referenced = scene.is_referenced(&node);
                layer.checked = renderable;
                layer.expanded = renderable;
                layer
            })
            .collect()
    }

    /// Discard all rows and rebuild them from the scene.
    pub fn refresh<S: SceneStateProvider + ?Sized>(&mut self, scene: &S) {
        let mut layers = Self::list_non_default_layers(scene, false);

        if !layers.iter().any(|l| l.is_default) {
            let mut default =
                RenderLayer::new(DEFAULT_LAYER_NAME, scene.frame_range(), scene.resolution());
            default.is_default = true;
            layers.insert(0, default);
        }

        debug!("Refreshed layer model: {} rows", layers.len());
        self.layers = layers;
    }

    /// All rows in display order.
    pub fn layers(&self) -> &[RenderLayer] {
        &self.layers
    }

    /// Row by display name.
    pub fn layer(&self, name: &str) -> Option<&RenderLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    fn layer_mut(&mut self, name: &str) -> Result<&mut RenderLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| LayerJobError::LayerNotFound {
                name: name.to_string(),
            })
    }

    /// Flip the checked state. Returns the new state.
    pub fn toggle_checked(&mut self, name: &str) -> Result<bool> {
        let layer = self.layer_mut(name)?;
        layer.checked = !layer.checked;
        Ok(layer.checked)
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) -> Result<()> {
        self.layer_mut(name)?.checked = checked;
        Ok(())
    }

    pub fn set_expanded(&mut self, name: &str, expanded: bool) -> Result<()> {
        self.layer_mut(name)?.expanded = expanded;
        Ok(())
    }

    pub fn expand_all(&mut self) {
        for layer in &mut self.layers {
            layer.expanded = true;
        }
    }

    /// Check exactly the named layers and uncheck the rest.
    pub fn select_only(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if self.layer(name).is_none() {
                return Err(LayerJobError::LayerNotFound { name: name.clone() });
            }
        }
        for layer in &mut self.layers {
            layer.checked = names.iter().any(|n| *n == layer.name);
        }
        Ok(())
    }

    /// Replace the text of the layer's frame-range leaf.
    pub fn set_frame_range_override(&mut self, name: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LayerJobError::InvalidFrameRange {
                text: text.to_string(),
            });
        }
        self.layer_mut(name)?.frame_range_override = Some(text.to_string());
        Ok(())
    }

    /// Replace the layer's width and height leaves.
    pub fn set_resolution_override(&mut self, name: &str, width: u32, height: u32) -> Result<()> {
        let layer = self.layer_mut(name)?;
        layer.width = width;
        layer.height = height;
        Ok(())
    }

    /// Checked rows in display order.
    pub fn checked_layers(&self) -> impl Iterator<Item = &RenderLayer> {
        self.layers.iter().filter(|l| l.checked)
    }

    /// Tree rows for display.
    pub fn rows(&self) -> Vec<LayerRow> {
        self.layers.iter().map(RenderLayer::row).collect()
    }
}
