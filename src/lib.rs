//! layerjob - render layer job synthesis
//!
//! Turns the render layers of a 3D scene into a render farm job bundle: one
//! step per checked layer, cloned from the bundle's prototype step, with the
//! layer's frame range, camera and embedded script fields filled in.
//!
//! # Modules
//!
//! - `scene`: scene state access and render camera resolution
//! - `layers`: layer rows with checked state and overrides
//! - `template`: job bundle documents, script patching, synthesis and binding
//! - `farm`: farm listing and bundle submission
//! - `session`: one submitter session from layers to submitted job
//! - `cfn`: queue environment splicing for farm templates

pub mod cfn;
pub mod cli;
pub mod config;
pub mod error;
pub mod farm;
pub mod layers;
pub mod scene;
pub mod session;
pub mod template;

pub use error::{LayerJobError, Result};
