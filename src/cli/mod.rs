//! CLI Module
//!
//! Command-line interface for layer job synthesis and submission.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// layerjob - render layer job synthesis and farm submission
#[derive(Parser, Debug)]
#[command(name = "layerjob")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the render layer rows of a scene
    #[command(name = "layers")]
    Layers {
        /// Scene snapshot file
        #[arg(short, long)]
        scene: PathBuf,

        /// Only list renderable, non-referenced layers
        #[arg(long)]
        renderable_only: bool,

        /// Show the size and frame range of every row, checked or not
        #[arg(long)]
        expand_all: bool,
    },

    /// Write one step per checked layer into the job bundle
    #[command(name = "synthesize")]
    Synthesize {
        #[command(flatten)]
        job: JobArgs,

        /// Print the job template instead of writing the bundle
        #[arg(long)]
        dry_run: bool,

        /// Do not query the farm (no fleet attribute is bound)
        #[arg(long)]
        offline: bool,
    },

    /// Synthesize the job bundle and submit it
    #[command(name = "submit")]
    Submit {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        farm: FarmArgs,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List farms
    #[command(name = "farms")]
    Farms,

    /// List the queues of a farm
    #[command(name = "queues")]
    Queues {
        #[arg(long)]
        farm_id: String,
    },

    /// List the fleet attributes of a farm
    #[command(name = "fleet-attrs")]
    FleetAttrs {
        #[arg(long)]
        farm_id: String,
    },

    /// Splice a queue environment into a CloudFormation farm template
    #[command(name = "apply-queue-env")]
    ApplyQueueEnv {
        /// CloudFormation template, modified in place
        cfn_template: PathBuf,

        /// Queue environment to insert
        queue_env: PathBuf,

        /// New CondaChannels default
        channels: String,
    },
}

/// Scene, bundle and job form arguments.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Scene snapshot file
    #[arg(short, long)]
    pub scene: PathBuf,

    /// Job bundle directory (defaults to the configured one)
    #[arg(short, long)]
    pub template_dir: Option<PathBuf>,

    /// Frame range used for every step, e.g. 1-100
    #[arg(long)]
    pub frames: Option<String>,

    /// Layers to render (comma separated); defaults to the renderable ones
    #[arg(long, value_delimiter = ',')]
    pub layers: Vec<String>,

    /// Per-layer frame range, e.g. beauty=1-50
    #[arg(long = "layer-frames", value_parser = parse_layer_frames)]
    pub layer_frames: Vec<(String, String)>,

    /// Per-layer size, e.g. beauty=1920x1080
    #[arg(long = "layer-size", value_parser = parse_layer_size)]
    pub layer_sizes: Vec<(String, u32, u32)>,

    /// Image width written to the parameter values
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height written to the parameter values
    #[arg(long)]
    pub height: Option<u32>,

    /// Fleet attribute value to require
    #[arg(long)]
    pub fleet_attr: Option<String>,
}

/// Farm, queue and job retry arguments.
#[derive(Args, Debug, Clone)]
pub struct FarmArgs {
    #[arg(long)]
    pub farm_id: Option<String>,

    /// Queue id or display name
    #[arg(long)]
    pub queue: Option<String>,

    #[arg(long)]
    pub priority: Option<u32>,

    /// Failed tasks allowed before the job fails
    #[arg(long)]
    pub job_retries: Option<u32>,

    #[arg(long)]
    pub task_retries: Option<u32>,
}

fn split_assignment(value: &str) -> Result<(&str, &str), String> {
    value
        .split_once('=')
        .filter(|(name, rest)| !name.is_empty() && !rest.is_empty())
        .ok_or_else(|| format!("expected LAYER=VALUE, got '{}'", value))
}

fn parse_layer_frames(value: &str) -> Result<(String, String), String> {
    let (name, frames) = split_assignment(value)?;
    Ok((name.to_string(), frames.to_string()))
}

fn parse_layer_size(value: &str) -> Result<(String, u32, u32), String> {
    let (name, size) = split_assignment(value)?;
    let (width, height) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size))?;
    let width = width
        .parse()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let height = height
        .parse()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;
    Ok((name.to_string(), width, height))
}
