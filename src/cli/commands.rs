//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use super::{FarmArgs, JobArgs};
use crate::cfn::apply_queue_env_file;
use crate::config::SubmitterConfig;
use crate::error::{LayerJobError, Result};
use crate::farm::mock::StaticFarmDirectory;
use crate::farm::{DeadlineCli, FarmDirectory};
use crate::layers::LayerSelectionModel;
use crate::scene::SceneSnapshot;
use crate::session::SubmitSession;
use crate::template::io::to_yaml;
use crate::template::TemplateBundle;

/// Print the layer rows of a scene.
pub fn list_layers(scene_path: &Path, renderable_only: bool, expand_all: bool) -> Result<()> {
    let scene = SceneSnapshot::load(scene_path)?;

    let mut model = if renderable_only {
        LayerSelectionModel::from_layers(LayerSelectionModel::list_non_default_layers(&scene, true))
    } else {
        LayerSelectionModel::from_scene(&scene)
    };
    if expand_all {
        model.expand_all();
    }

    for row in model.rows() {
        print!("{}", row);
    }
    Ok(())
}

/// Open a session and apply the job arguments to it.
fn open_session(
    args: &JobArgs,
    config: &SubmitterConfig,
    directory: &dyn FarmDirectory,
) -> Result<SubmitSession> {
    let scene = SceneSnapshot::load(&args.scene)?;
    let template_dir = args
        .template_dir
        .clone()
        .or_else(|| config.template_dir.clone())
        .ok_or_else(|| LayerJobError::InvalidTemplate {
            reason: "no job bundle directory given (--template-dir or LAYERJOB_TEMPLATE_DIR)"
                .to_string(),
        })?;

    let mut session = SubmitSession::open(
        Box::new(scene),
        config,
        TemplateBundle::new(template_dir),
        directory,
    );

    let layers = session.layers_mut();
    if !args.layers.is_empty() {
        layers.select_only(&args.layers)?;
    }
    for (name, frames) in &args.layer_frames {
        layers.set_frame_range_override(name, frames)?;
    }
    for (name, width, height) in &args.layer_sizes {
        layers.set_resolution_override(name, *width, *height)?;
    }

    let settings = session.settings_mut();
    if let Some(frames) = &args.frames {
        settings.frame_range_text = frames.clone();
        settings.frames_override = true;
    }
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }

    Ok(session)
}

fn select_fleet_attribute(session: &mut SubmitSession, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        if !session.selection_mut().select_fleet_attribute(value) {
            return Err(LayerJobError::FarmQuery {
                reason: format!("fleet attribute '{}' is not listed for the farm", value),
            });
        }
    }
    Ok(())
}

/// Synthesize the job bundle for the checked layers.
pub fn synthesize(args: &JobArgs, config: &SubmitterConfig, dry_run: bool, offline: bool) -> Result<()> {
    let deadline = DeadlineCli::new(config.deadline_command.clone());
    let offline_directory = StaticFarmDirectory::new();
    let directory: &dyn FarmDirectory = if offline {
        &offline_directory
    } else {
        &deadline
    };

    let mut session = open_session(args, config, directory)?;
    select_fleet_attribute(&mut session, args.fleet_attr.as_deref())?;

    if dry_run {
        let prepared = session.prepare()?;
        print!("{}", to_yaml(&prepared.template)?);
        return Ok(());
    }

    let prepared = session.write()?;
    println!(
        "Wrote {} step(s) for '{}' to {}",
        prepared.template.steps.len(),
        prepared.template.name,
        session.bundle().dir().display()
    );
    if prepared.render_camera.is_empty() {
        println!("No shot camera found; steps render with an empty camera");
    }
    Ok(())
}

/// Synthesize the job bundle and submit it to the farm.
pub fn submit(args: &JobArgs, farm: &FarmArgs, config: &SubmitterConfig, json: bool) -> Result<()> {
    let deadline = DeadlineCli::new(config.deadline_command.clone());
    let mut session = open_session(args, config, &deadline)?;

    if let Some(farm_id) = &farm.farm_id {
        if !session
            .selection_mut()
            .select_farm(&deadline, farm_id, &config.farm)
        {
            return Err(LayerJobError::FarmQuery {
                reason: format!("farm '{}' is not listed", farm_id),
            });
        }
    }
    if let Some(queue) = &farm.queue {
        if !session.selection_mut().select_queue(queue) {
            return Err(LayerJobError::FarmQuery {
                reason: format!("queue '{}' is not listed for the farm", queue),
            });
        }
    }
    select_fleet_attribute(&mut session, args.fleet_attr.as_deref())?;

    let settings = session.settings_mut();
    if let Some(priority) = farm.priority {
        settings.priority = priority;
    }
    if let Some(retries) = farm.job_retries {
        settings.job_retries = retries;
    }
    if let Some(retries) = farm.task_retries {
        settings.task_retries = retries;
    }

    let outcome = session.submit(&deadline)?;
    info!("Submitted '{}' ({} step(s))", outcome.job_name, outcome.step_count);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.status.trim_end());
    }
    if outcome.needs_confirmation {
        warn!("The submit tool asked for confirmation; check the submission status");
    }
    Ok(())
}

/// List the farms visible to the farm CLI.
pub fn list_farms(config: &SubmitterConfig) -> Result<()> {
    let deadline = DeadlineCli::new(config.deadline_command.clone());
    for farm in deadline.list_farms() {
        println!("{}\t{}", farm.farm_id, farm.display_name);
    }
    Ok(())
}

pub fn list_queues(config: &SubmitterConfig, farm_id: &str) -> Result<()> {
    let deadline = DeadlineCli::new(config.deadline_command.clone());
    for queue in deadline.list_queues(farm_id) {
        println!("{}\t{}", queue.queue_id, queue.display_name);
    }
    Ok(())
}

pub fn list_fleet_attributes(config: &SubmitterConfig, farm_id: &str) -> Result<()> {
    let deadline = DeadlineCli::new(config.deadline_command.clone());
    for attr in deadline.list_fleet_attributes(farm_id) {
        println!("{}\t{}", attr.attr_name, attr.attr_value);
    }
    Ok(())
}

/// Splice a queue environment into a CloudFormation template in place.
pub fn apply_queue_env(cfn_template: &Path, queue_env: &Path, channels: &str) -> Result<()> {
    apply_queue_env_file(cfn_template, queue_env, channels)?;
    println!(
        "Queue environment written into {}; check the template before deploying it.",
        cfn_template.display()
    );
    Ok(())
}
