use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[clap(
    name = "telemetry",
    about = "Emit partitioned telemetry events and inspect the batching config",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// TOML file overriding the built-in defaults
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Emit events to one partition and wait until they are delivered
    Emit(EmitArgs),

    /// Print the effective configuration
    ShowConfig,
}

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[clap(long)]
    pub domain: String,
    #[clap(long)]
    pub entity: String,
    /// Event payload; `{n}` is replaced with the event's sequence number
    #[clap(long, default_value = "event {n}")]
    pub body: String,
    #[clap(long, default_value_t = 1)]
    pub count: usize,
    /// Overrides `event_forward_endpoint` from the config
    #[clap(long)]
    pub endpoint: Option<String>,
}
