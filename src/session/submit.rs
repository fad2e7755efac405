//! Submit session
//!
//! One open submitter: the scene it was opened on, the layer rows, the job
//! form, the farm choice and the job bundle directory. `submit` runs the
//! whole synthesize, write, submit sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::settings::JobSettings;
use crate::config::SubmitterConfig;
use crate::error::{LayerJobError, Result};
use crate::farm::{needs_confirmation, FarmDirectory, FarmSelection, JobSubmitter, SubmitRequest};
use crate::layers::LayerSelectionModel;
use crate::scene::{resolve_render_camera, SceneStateProvider};
use crate::template::{JobTemplate, ParameterValues, TemplateBundle, TemplateStepSynthesizer};

/// Documents produced for one submission, not yet written.
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    pub template: JobTemplate,
    pub params: ParameterValues,
    pub render_camera: String,
}

/// Result of a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub session_id: String,
    pub job_name: String,
    pub step_count: usize,
    /// Text printed by the submit tool.
    pub status: String,
    /// The submit tool asked for confirmation.
    pub needs_confirmation: bool,
    pub opened_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

/// Clears the in-progress flag when dropped.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LayerJobError::SubmitInProgress)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SubmitSession {
    id: String,
    opened_at: DateTime<Utc>,
    scene: Box<dyn SceneStateProvider>,
    layers: LayerSelectionModel,
    settings: JobSettings,
    selection: FarmSelection,
    bundle: TemplateBundle,
    busy: Arc<AtomicBool>,
}

impl SubmitSession {
    /// Open a session: read the layers, seed the form and pick the farm.
    pub fn open(
        scene: Box<dyn SceneStateProvider>,
        config: &SubmitterConfig,
        bundle: TemplateBundle,
        directory: &dyn FarmDirectory,
    ) -> Self {
        let layers = LayerSelectionModel::from_scene(scene.as_ref());
        let settings = JobSettings::from_scene(scene.as_ref(), config);
        let selection = FarmSelection::load(directory, &config.farm);

        let session = Self {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            scene,
            layers,
            settings,
            selection,
            bundle,
            busy: Arc::new(AtomicBool::new(false)),
        };
        info!(
            "Opened session {} for '{}' ({} layer rows)",
            session.id,
            session.settings.job_name,
            session.layers.layers().len()
        );
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scene(&self) -> &dyn SceneStateProvider {
        self.scene.as_ref()
    }

    pub fn layers(&self) -> &LayerSelectionModel {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerSelectionModel {
        &mut self.layers
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut JobSettings {
        &mut self.settings
    }

    pub fn selection(&self) -> &FarmSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut FarmSelection {
        &mut self.selection
    }

    pub fn bundle(&self) -> &TemplateBundle {
        &self.bundle
    }

    /// Shared in-progress flag, set while a submission runs.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    /// Rebuild the layer rows from the scene.
    pub fn refresh_layers(&mut self) {
        self.layers.refresh(self.scene.as_ref());
    }

    /// Synthesize both documents in memory.
    ///
    /// Resolves the render camera first, which updates the scene's camera
    /// flags.
    pub fn prepare(&mut self) -> Result<PreparedSubmission> {
        let template = self.bundle.read_template()?;
        let mut params = self.bundle.read_parameter_values()?;

        let render_camera = resolve_render_camera(self.scene.as_mut());
        let synthesizer = TemplateStepSynthesizer::from_template(&template)?;
        let template = synthesizer.synthesize_job(
            template,
            self.layers.layers(),
            &render_camera,
            self.settings.frame_override(),
            &self.scene.scene_file_name(),
        )?;

        params.bind(&self.settings.bind_values(self.selection.fleet_attribute()))?;

        Ok(PreparedSubmission {
            template,
            params,
            render_camera,
        })
    }

    /// Synthesize and write both documents back to the bundle.
    pub fn write(&mut self) -> Result<PreparedSubmission> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.write_documents()
    }

    fn write_documents(&mut self) -> Result<PreparedSubmission> {
        let prepared = self.prepare()?;
        self.bundle
            .write_documents(&prepared.template, &prepared.params)?;
        info!(
            "Wrote {} step(s) to {}",
            prepared.template.steps.len(),
            self.bundle.dir().display()
        );
        Ok(prepared)
    }

    /// Write the bundle and submit it to the selected farm and queue.
    pub fn submit(&mut self, submitter: &dyn JobSubmitter) -> Result<SubmitOutcome> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let farm_id = self
            .selection
            .farm()
            .map(|f| f.farm_id.clone())
            .ok_or_else(|| LayerJobError::SubmitFailed {
                reason: "no farm selected".to_string(),
            })?;
        let queue_id = self
            .selection
            .queue()
            .map(|q| q.queue_id.clone())
            .ok_or_else(|| LayerJobError::SubmitFailed {
                reason: "no queue selected".to_string(),
            })?;

        let prepared = self.write_documents()?;

        let request = SubmitRequest {
            priority: self.settings.priority,
            job_retries: self.settings.job_retries,
            task_retries: self.settings.task_retries,
            template_dir: self.bundle.dir().to_path_buf(),
            farm_id,
            queue_id,
        };
        let status = submitter.submit(&request);
        let needs_confirmation = needs_confirmation(&status);
        if needs_confirmation {
            warn!("Submission is waiting for confirmation");
        }

        Ok(SubmitOutcome {
            session_id: self.id.clone(),
            job_name: prepared.template.name,
            step_count: prepared.template.steps.len(),
            status,
            needs_confirmation,
            opened_at: self.opened_at,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::mock::{RecordingSubmitter, StaticFarmDirectory};
    use crate::scene::SceneSnapshot;
    use tempfile::{tempdir, TempDir};

    const SCENE: &str = r#"
scene_path: /jobs/show/shot010/scenes/shot010.mb
workspace: /jobs/show/shot010
resolution: { width: 1920, height: 1080 }
frame_range: [1, 24]
layers:
  - name: defaultRenderLayer
    renderable: false
  - name: rs_beauty
cameras:
  - name: shotCam_main
    renderable: false
"#;

    const TEMPLATE: &str = r#"
specificationVersion: jobtemplate-2023-09
name: placeholder
steps:
  - name: Render
    parameterSpace:
      taskParameterDefinitions:
        - name: Frame
          type: INT
          range: "1-10"
        - name: Camera
          type: STRING
          range: [persp]
    stepEnvironments:
      - name: MayaSettings
        script:
          embeddedFiles:
            - name: initData
              type: TEXT
              data: "render_layer: masterLayer\nimage_width: 640\nimage_height: 480\n"
"#;

    fn bundle_dir(param_count: usize) -> TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("template.yaml"), TEMPLATE).unwrap();
        let mut params = String::from("parameterValues:\n");
        for i in 0..param_count {
            params.push_str(&format!("  - name: P{}\n    value: v{}\n", i, i));
        }
        std::fs::write(dir.path().join("parameter_values.yaml"), params).unwrap();
        dir
    }

    fn open(dir: &TempDir) -> SubmitSession {
        let scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
        let directory = StaticFarmDirectory::new()
            .with_farm("farm-1", "ProdFarm")
            .with_queue("farm-1", "queue-1", "Render");
        let mut config = SubmitterConfig::default();
        config.farm.default_farm_display_name = Some("ProdFarm".to_string());
        SubmitSession::open(
            Box::new(scene),
            &config,
            TemplateBundle::new(dir.path()),
            &directory,
        )
    }

    #[test]
    fn test_submit_writes_then_submits() {
        let dir = bundle_dir(15);
        let mut session = open(&dir);
        let submitter = RecordingSubmitter::new("Submitted job bundle");

        let outcome = session.submit(&submitter).unwrap();

        assert_eq!(outcome.job_name, "shot010.mb");
        assert_eq!(outcome.step_count, 1);
        assert!(!outcome.needs_confirmation);
        assert!(outcome.opened_at <= outcome.submitted_at);

        let requests = submitter.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].farm_id, "farm-1");
        assert_eq!(requests[0].queue_id, "queue-1");
        assert_eq!(requests[0].priority, 50);

        let written = session.bundle().read_template().unwrap();
        assert_eq!(written.steps[0].name, "beauty");
        assert!(!session.busy_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_short_parameter_document_writes_nothing() {
        let dir = bundle_dir(10);
        let mut session = open(&dir);
        let submitter = RecordingSubmitter::new("ok");

        let err = session.submit(&submitter).unwrap_err();

        assert!(matches!(err, LayerJobError::OutOfRange { len: 10, .. }));
        assert!(submitter.requests().is_empty());
        let template = std::fs::read_to_string(dir.path().join("template.yaml")).unwrap();
        assert_eq!(template, TEMPLATE);
        assert!(!session.busy_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_submit_while_busy() {
        let dir = bundle_dir(15);
        let mut session = open(&dir);
        session.busy_flag().store(true, Ordering::SeqCst);

        let err = session.submit(&RecordingSubmitter::new("ok")).unwrap_err();
        assert!(matches!(err, LayerJobError::SubmitInProgress));
    }

    #[test]
    fn test_submit_without_queue() {
        let dir = bundle_dir(15);
        let scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
        let mut session = SubmitSession::open(
            Box::new(scene),
            &SubmitterConfig::default(),
            TemplateBundle::new(dir.path()),
            &StaticFarmDirectory::new(),
        );

        let err = session.submit(&RecordingSubmitter::new("ok")).unwrap_err();
        assert!(matches!(err, LayerJobError::SubmitFailed { .. }));
    }

    #[test]
    fn test_job_is_named_after_scene_file() {
        let dir = bundle_dir(15);
        let mut session = open(&dir);
        session.settings_mut().job_name = "renamed on the form".to_string();

        let prepared = session.prepare().unwrap();

        assert_eq!(prepared.template.name, "shot010.mb");
    }

    #[test]
    fn test_farm_without_queues_blocks_submit() {
        let dir = bundle_dir(15);
        let directory = StaticFarmDirectory::new()
            .with_farm("farm-1", "ProdFarm")
            .with_farm("farm-2", "IdleFarm")
            .with_queue("farm-1", "queue-1", "Render");
        let mut config = SubmitterConfig::default();
        config.farm.default_farm_display_name = Some("ProdFarm".to_string());
        let mut session = SubmitSession::open(
            Box::new(SceneSnapshot::from_yaml_str(SCENE).unwrap()),
            &config,
            TemplateBundle::new(dir.path()),
            &directory,
        );
        assert_eq!(session.selection().queue().unwrap().queue_id, "queue-1");

        assert!(session
            .selection_mut()
            .select_farm(&directory, "farm-2", &config.farm));
        let submitter = RecordingSubmitter::new("ok");

        let err = session.submit(&submitter).unwrap_err();

        assert!(matches!(err, LayerJobError::SubmitFailed { .. }));
        assert!(submitter.requests().is_empty());
        let template = std::fs::read_to_string(dir.path().join("template.yaml")).unwrap();
        assert_eq!(template, TEMPLATE);
    }

    #[test]
    fn test_confirmation_prompt_detected() {
        let dir = bundle_dir(15);
        let mut session = open(&dir);
        let submitter = RecordingSubmitter::new("Upload 3 GB?\nDo you wish to proceed? [y/N]");

        let outcome = session.submit(&submitter).unwrap();
        assert!(outcome.needs_confirmation);
    }
}
