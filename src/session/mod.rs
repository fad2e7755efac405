//! Submitter sessions
//!
//! At most one session is open at a time. `SessionSlot` owns it; callers open
//! and release it explicitly.

mod settings;
mod submit;

pub use settings::JobSettings;
pub use submit::{PreparedSubmission, SubmitOutcome, SubmitSession};

use log::info;

use crate::error::{LayerJobError, Result};

/// Holder of the single open session.
#[derive(Default)]
pub struct SessionSlot {
    current: Option<SubmitSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session. Fails if one is already open.
    pub fn open(&mut self, session: SubmitSession) -> Result<&mut SubmitSession> {
        if let Some(current) = &self.current {
            return Err(LayerJobError::SessionActive {
                session_id: current.id().to_string(),
            });
        }
        Ok(self.current.insert(session))
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&mut self) -> Option<&mut SubmitSession> {
        self.current.as_mut()
    }

    /// Close the open session and hand it back.
    pub fn release(&mut self) -> Option<SubmitSession> {
        let session = self.current.take();
        if let Some(session) = &session {
            info!("Released session {}", session.id());
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubmitterConfig;
    use crate::farm::mock::StaticFarmDirectory;
    use crate::scene::SceneSnapshot;
    use crate::template::TemplateBundle;

    fn session() -> SubmitSession {
        let scene = SceneSnapshot::from_yaml_str(
            "scene_path: /a/b.mb\nworkspace: /a\nresolution: { width: 10, height: 10 }\nframe_range: [1, 2]\n",
        )
        .unwrap();
        SubmitSession::open(
            Box::new(scene),
            &SubmitterConfig::default(),
            TemplateBundle::new("/tmp/unused"),
            &StaticFarmDirectory::new(),
        )
    }

    #[test]
    fn test_single_open_session() {
        let mut slot = SessionSlot::new();
        let first_id = slot.open(session()).unwrap().id().to_string();

        let err = slot.open(session()).err().unwrap();
        match err {
            LayerJobError::SessionActive { session_id } => assert_eq!(session_id, first_id),
            other => panic!("unexpected error: {other}"),
        }

        let released = slot.release().unwrap();
        assert_eq!(released.id(), first_id);
        assert!(!slot.is_open());
        assert!(slot.open(session()).is_ok());
    }
}
