use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use config::{Config as RConfig, Environment, File, FileFormat};
use telemetry_common::constants::{
    BATCH_INTERVAL_MS, CLOSE_GRACE_PERIOD_MS, DEFAULT_LOG_LEVEL, ENV_PREFIX, MAX_BATCH_SIZE,
    MAX_CONCURRENT_SENDS, QUEUE_CAPACITY, SEND_TIMEOUT_MS,
};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Pending events held per partition before new ones are dropped.
    pub queue_capacity: usize,
    pub max_batch_size: usize,
    pub batch_interval_ms: u64,
    pub send_timeout_ms: u64,
    pub max_concurrent_sends: usize,
    pub close_grace_period_ms: u64,

    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub event_forward_endpoint: Option<String>,
}

impl Config {
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn close_grace_period(&self) -> Duration {
        Duration::from_millis(self.close_grace_period_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            bail!("queue_capacity must be at least 1");
        }
        if self.max_batch_size == 0 {
            bail!("max_batch_size must be at least 1");
        }
        if self.max_concurrent_sends == 0 {
            bail!("max_concurrent_sends must be at least 1");
        }
        if self.batch_interval_ms == 0 {
            bail!("batch_interval_ms must be greater than 0");
        }
        if self.send_timeout_ms == 0 {
            bail!("send_timeout_ms must be greater than 0");
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = RConfig::builder()
            .set_default("queue_capacity", QUEUE_CAPACITY as u64)?
            .set_default("max_batch_size", MAX_BATCH_SIZE as u64)?
            .set_default("batch_interval_ms", BATCH_INTERVAL_MS)?
            .set_default("send_timeout_ms", SEND_TIMEOUT_MS)?
            .set_default("max_concurrent_sends", MAX_CONCURRENT_SENDS as u64)?
            .set_default("close_grace_period_ms", CLOSE_GRACE_PERIOD_MS)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        Ok(builder)
    }

    /// Built-in defaults overridden by `TELEMETRY_*` environment variables.
    pub fn load_default_config() -> Result<Config> {
        Self::load_config(None)
    }

    /// Defaults, then the optional TOML file, then `TELEMETRY_*` environment
    /// variables. Later sources win.
    pub fn load_config(path: Option<&Path>) -> Result<Config> {
        let mut builder = Self::builder()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: Config = builder
            .build()
            .with_context(|| match path {
                Some(path) => format!("failed to load config from {}", path.display()),
                None => "failed to load config".to_string(),
            })?
            .try_deserialize()
            .context("failed to parse config file")?;

        config.validate().context("invalid telemetry config")?;

        Ok(config)
    }
}
