//! Render camera resolution
//!
//! Picking the render camera mutates the scene: every camera loses its
//! renderable flag and only the chosen shot camera gets it back. Callers run
//! this once per submit and hand the returned name to the synthesizer.

use log::{debug, warn};

use super::provider::SceneStateProvider;

/// Substring that marks a shot camera.
pub const SHOT_CAMERA_TAG: &str = "shotCam";

/// Make the first shot camera the only renderable camera and return its
/// name, or an empty string when the scene has no shot camera.
pub fn resolve_render_camera<S: SceneStateProvider + ?Sized>(scene: &mut S) -> String {
    let cameras = scene.cameras();

    for camera in &cameras {
        scene.set_camera_renderable(camera, false);
    }

    for camera in &cameras {
        if camera.contains(SHOT_CAMERA_TAG) && scene.set_camera_renderable(camera, true) {
            scene.select_camera(camera);
            debug!("Render camera: {}", camera);
            return camera.clone();
        }
    }

    warn!(
        "No camera containing '{}' found; steps will use an empty camera",
        SHOT_CAMERA_TAG
    );
    String::new()
}
