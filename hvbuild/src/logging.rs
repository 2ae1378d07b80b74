//! Logging setup for embedders.

use std::path::PathBuf;

use hvbuild_shared::errors::{HvbuildError, HvbuildResult};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "hvbuild.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Write to a daily-rolling file in this directory instead of stderr.
    pub log_dir: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_filter: "info".to_string(),
        }
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when logging to a file; keep it alive for
/// as long as logs should be flushed. A subscriber that is already installed
/// is left in place.
pub fn init_logging(options: &LogOptions) -> HvbuildResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    let Some(log_dir) = &options.log_dir else {
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global subscriber already installed");
        }
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir).map_err(|e| {
        HvbuildError::Config(format!(
            "failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed");
        return Ok(None);
    }

    Ok(Some(guard))
}
