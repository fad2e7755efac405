//! Layer Model Module
//!
//! In-memory render layer rows, independent of any UI toolkit.

mod render_layer;
mod selection;

pub use render_layer::{LayerRow, RenderLayer, SizeNode};
pub use selection::LayerSelectionModel;
