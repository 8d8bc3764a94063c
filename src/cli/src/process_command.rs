use crate::commands::{Cli, Commands, EmitArgs};
use anyhow::{bail, Context, Result};
use clap::Parser;
use telemetry_client::config_manager::{Config, ConfigLoader};
use telemetry_client::exporters::batcher::PartitionedWorkerPool;
use telemetry_client::exporters::event_forward::EventForward;
use telemetry_client::logging::setup_logging;
use telemetry_common::event::Event;

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    // Use the --config flag, if provided, when loading the configuration
    let config = ConfigLoader::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ShowConfig => print_config(&config),
        Commands::Emit(args) => {
            setup_logging(&config.log_level, config.log_file.as_deref())?;
            tokio::runtime::Runtime::new()?.block_on(run_emit(config, args))
        }
    }
}

fn print_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{rendered}");
    Ok(())
}

pub fn build_events(args: &EmitArgs) -> Vec<Event> {
    (0..args.count)
        .map(|n| {
            let body = args.body.replace("{n}", &n.to_string());
            Event::for_partition(args.domain.as_str(), args.entity.as_str(), body)
        })
        .collect()
}

async fn run_emit(config: Config, args: EmitArgs) -> Result<()> {
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| config.event_forward_endpoint.clone())
        .context("No endpoint: pass --endpoint or set event_forward_endpoint")?;

    let pool = PartitionedWorkerPool::new(config, EventForward::new(endpoint))?;
    for event in build_events(&args) {
        pool.emit(event)?;
    }
    pool.close().await?;

    let stats = pool.stats();
    let rendered = toml::to_string_pretty(&stats).context("Failed to render delivery stats")?;
    println!("{rendered}");

    if stats.batches_failed > 0 {
        bail!(
            "{} of {} batches failed to deliver",
            stats.batches_failed,
            stats.batches_failed + stats.batches_sent
        );
    }
    Ok(())
}
