use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. With `log_file` the output goes to
/// that file (never rotated), otherwise to stderr. The batching core only
/// logs through `tracing` macros, so skipping this call leaves it silent but
/// fully functional.
pub fn setup_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level `{}`", level))?;

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("log file path has no file name")?;
            let file_appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);

            let file_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_level(true)
                .with_timer(SystemTime)
                .with_ansi(false)
                .with_writer(file_appender);

            tracing::subscriber::set_global_default(
                tracing_subscriber::registry().with(filter).with(file_layer),
            )
            .context("Failed to set tracing subscriber")?;

            tracing::info!("Logging system initialized. Writing to {}", path.display());
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_timer(SystemTime)
                .with_writer(std::io::stderr);

            tracing::subscriber::set_global_default(
                tracing_subscriber::registry().with(filter).with(stderr_layer),
            )
            .context("Failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
