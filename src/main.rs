//! layerjob CLI
//!
//! Synthesizes render-layer job bundles and submits them to a render farm.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use layerjob::cli::{commands, Cli, Commands};
use layerjob::config::SubmitterConfig;
use layerjob::LayerJobError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("layerjob v{}", env!("CARGO_PKG_VERSION"));

    let config = SubmitterConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("layerjob v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &SubmitterConfig) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::Layers {
            scene,
            renderable_only,
            expand_all,
        } => commands::list_layers(&scene, renderable_only, expand_all),
        Commands::Synthesize {
            job,
            dry_run,
            offline,
        } => commands::synthesize(&job, config, dry_run, offline),
        Commands::Submit { job, farm, json } => commands::submit(&job, &farm, config, json),
        Commands::Farms => commands::list_farms(config),
        Commands::Queues { farm_id } => commands::list_queues(config, &farm_id),
        Commands::FleetAttrs { farm_id } => commands::list_fleet_attributes(config, &farm_id),
        Commands::ApplyQueueEnv {
            cfn_template,
            queue_env,
            channels,
        } => commands::apply_queue_env(&cfn_template, &queue_env, &channels),
    };

    result.map_err(|err: LayerJobError| {
        if let Some(hint) = err.recovery_suggestion() {
            error!("{} [{}]: {}", err, err.error_code(), hint);
        }
        anyhow::Error::new(err)
    })
}
