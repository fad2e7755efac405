//! Synthesis Tests
//!
//! Layer rows from a scene snapshot through step synthesis and parameter
//! binding, using only the public API.

use layerjob::layers::{LayerSelectionModel, RenderLayer};
use layerjob::scene::{resolve_render_camera, FrameRange, Resolution, SceneSnapshot};
use layerjob::template::{
    patch, BindValues, JobTemplate, ParameterValues, ScriptField, TaskRange,
    TemplateStepSynthesizer, CAMERA_PARAM_INDEX, FRAME_RANGE_PARAM_INDEX,
};
use layerjob::LayerJobError;
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use test_case::test_case;

const TEMPLATE: &str = r#"
specificationVersion: jobtemplate-2023-09
name: placeholder
parameterDefinitions:
  - name: Frames
    type: STRING
steps:
  - name: Render
    parameterSpace:
      taskParameterDefinitions:
        - name: Frame
          type: INT
          range: "{{Param.Frames}}"
        - name: Camera
          type: STRING
          range: [persp]
    stepEnvironments:
      - name: MayaSettings
        script:
          embeddedFiles:
            - name: initData
              type: TEXT
              data: "render_layer: masterLayer\nimage_width: 1920\nimage_height: 1080\n"
    script:
      actions:
        onRun:
          command: mayapy
"#;

const SCENE: &str = r#"
scene_path: /jobs/show/shot020/scenes/shot020_light.mb
workspace: /jobs/show/shot020
resolution: { width: 1920, height: 1080 }
frame_range: [1, 10]
layers:
  - name: defaultRenderLayer
    renderable: false
  - name: rs_beauty
  - name: rs_shadow
    renderable: false
  - name: rs_crowd
    referenced: true
cameras:
  - name: persp
    renderable: true
  - name: shotCam_main
    renderable: false
"#;

fn template() -> JobTemplate {
    serde_yaml::from_str(TEMPLATE).unwrap()
}

fn layer(name: &str, checked: bool, start: i64, end: i64) -> RenderLayer {
    RenderLayer::new(name, FrameRange::new(start, end), Resolution::new(1920, 1080))
        .with_checked(checked)
}

fn frame_text(template: &JobTemplate, step: usize) -> String {
    template.steps[step]
        .task_parameter(FRAME_RANGE_PARAM_INDEX)
        .and_then(|p| p.range.as_expression())
        .unwrap()
        .to_string()
}

// === Scenarios ===

#[test]
fn test_scenario_single_checked_layer() {
    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let layers = vec![layer("beauty", true, 1, 10), layer("shadow", false, 1, 10)];

    let job = synth
        .synthesize_job(template(), &layers, "shotCam_main", None, "shot020.mb")
        .unwrap();

    assert_eq!(job.name, "shot020.mb");
    assert_eq!(job.steps.len(), 1);
    assert_eq!(job.steps[0].name, "beauty");
    assert_eq!(frame_text(&job, 0), "1-10");
}

#[test]
fn test_scenario_frame_override() {
    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let layers = vec![layer("beauty", true, 1, 10), layer("shadow", true, 20, 30)];

    let job = synth
        .synthesize_job(template(), &layers, "shotCam_main", Some("1-100"), "shot020.mb")
        .unwrap();

    assert_eq!(job.steps.len(), 2);
    assert_eq!(frame_text(&job, 0), "1-100");
    assert_eq!(frame_text(&job, 1), "1-100");
}

#[test]
fn test_scenario_patch_at_blob_start() {
    let blob = "render_layer: beauty\nimage_width: 1920\nimage_height: 1080\n";

    let patched = patch(blob, ScriptField::RenderLayer, "shadow").unwrap();

    assert_eq!(
        patched,
        "render_layer: shadow\nimage_width: 1920\nimage_height: 1080\n"
    );
}

#[test]
fn test_scenario_no_shot_camera() {
    let mut scene = SceneSnapshot::from_yaml_str(
        "scene_path: /a/b.mb\nresolution: { width: 1, height: 1 }\nframe_range: [1, 1]\ncameras:\n  - name: persp\n    renderable: true\n",
    )
    .unwrap();

    let camera = resolve_render_camera(&mut scene);
    assert_eq!(camera, "");
    assert_eq!(scene.camera_renderable("persp"), Some(false));

    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let steps = synth
        .synthesize(&[layer("beauty", true, 1, 10)], &camera, None)
        .unwrap();

    assert_eq!(
        steps[0].task_parameter(CAMERA_PARAM_INDEX).unwrap().range,
        TaskRange::values([""])
    );
}

// === Checked patterns ===

#[test_case(&[true, true, true, true] ; "all checked")]
#[test_case(&[true, false, true, false, true, false] ; "alternating")]
#[test_case(&[false, false, false, false, true] ; "only the last")]
#[test_case(&[true, false, false, false, false] ; "only the first")]
#[test_case(&[false; 8] ; "none of many")]
fn test_checked_layers_become_steps_in_order(pattern: &[bool]) {
    let layers: Vec<RenderLayer> = pattern
        .iter()
        .enumerate()
        .map(|(i, checked)| layer(&format!("layer{}", i), *checked, i as i64, i as i64 + 10))
        .collect();
    let expected: Vec<String> = layers
        .iter()
        .filter(|l| l.checked)
        .map(|l| l.name.clone())
        .collect();

    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let job = synth
        .synthesize_job(template(), &layers, "shotCam_main", None, "shot020.mb")
        .unwrap();

    let names: Vec<String> = job.steps.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, expected);
    for (step, name) in expected.iter().enumerate() {
        let index: i64 = name.trim_start_matches("layer").parse().unwrap();
        assert_eq!(frame_text(&job, step), format!("{}-{}", index, index + 10));
        assert!(job.steps[step]
            .embedded_script()
            .unwrap()
            .data
            .starts_with(&format!("render_layer: {}\n", name)));
    }
}

// === Scene to steps ===

#[test]
fn test_scene_layers_to_steps() {
    let mut scene = SceneSnapshot::from_yaml_str(SCENE).unwrap();
    let mut model = LayerSelectionModel::from_scene(&scene);

    // referenced layers never appear; the default layer row is kept
    let names: Vec<&str> = model.layers().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["defaultRenderLayer", "beauty", "shadow"]);

    model.toggle_checked("shadow").unwrap();
    model.set_frame_range_override("shadow", "5-6").unwrap();
    model.set_resolution_override("shadow", 960, 540).unwrap();

    let camera = resolve_render_camera(&mut scene);
    assert_eq!(camera, "shotCam_main");
    assert_eq!(scene.selected_camera.as_deref(), Some("shotCam_main"));

    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let job = synth
        .synthesize_job(template(), model.layers(), &camera, None, "shot020_light.mb")
        .unwrap();

    assert_eq!(job.steps.len(), 2);
    assert_eq!(job.steps[1].name, "shadow");
    assert_eq!(frame_text(&job, 1), "5-6");
    assert_eq!(
        job.steps[1].embedded_script().unwrap().data,
        "render_layer: shadow\nimage_width: 960\nimage_height: 540\n"
    );
    assert_eq!(
        job.steps[0].task_parameter(CAMERA_PARAM_INDEX).unwrap().range,
        TaskRange::values(["shotCam_main"])
    );
}

#[test]
fn test_unknown_template_keys_survive() {
    let synth = TemplateStepSynthesizer::from_template(&template()).unwrap();
    let job = synth
        .synthesize_job(template(), &[layer("beauty", true, 1, 10)], "", None, "x.mb")
        .unwrap();

    let yaml = serde_yaml::to_string(&job).unwrap();
    assert!(yaml.contains("specificationVersion: jobtemplate-2023-09"));
    assert!(yaml.contains("command: mayapy"));
    assert!(yaml.contains("type: INT"));
    assert!(!yaml.contains('&'), "no anchors expected in:\n{}", yaml);
}

// === Binding ===

#[test]
fn test_bind_preserves_foreign_slots() {
    let mut params: ParameterValues = serde_yaml::from_str(
        &(0..15)
            .map(|i| format!("  - name: P{}\n    value: keep-{}\n", i, i))
            .fold(String::from("parameterValues:\n"), |acc, line| acc + &line),
    )
    .unwrap();

    params
        .bind(&BindValues {
            scene_path: "/s.mb".to_string(),
            frame_range_text: "1-10".to_string(),
            width: 1920,
            height: 1080,
            project_path: "/p".to_string(),
            output_path: "/p/maya/images".to_string(),
            fleet_attr_value: None,
            fleet_attr_display: String::new(),
        })
        .unwrap();

    let values: Vec<&Value> = params.parameter_values.iter().map(|p| &p.value).collect();
    assert_eq!(values[0], &Value::from("/s.mb"));
    assert_eq!(values[2], &Value::from("keep-2"));
    assert_eq!(values[3], &Value::from(1920u32));
    for i in 7..=12 {
        assert_eq!(values[i], &Value::from(format!("keep-{}", i)));
    }
    assert_eq!(values[13], &Value::Null);
}

#[test]
fn test_bind_rejects_short_document() {
    let mut params: ParameterValues =
        serde_yaml::from_str("parameterValues:\n  - value: a\n  - value: b\n").unwrap();
    let before = params.clone();

    let err = params
        .bind(&BindValues {
            scene_path: String::new(),
            frame_range_text: String::new(),
            width: 0,
            height: 0,
            project_path: String::new(),
            output_path: String::new(),
            fleet_attr_value: None,
            fleet_attr_display: String::new(),
        })
        .unwrap_err();

    assert!(matches!(err, LayerJobError::OutOfRange { len: 2, .. }));
    assert_eq!(params, before);
}
