//! Logging configuration using tracing
//!
//! Headless output owns stdout, so logs only ever go to a daily rolling file.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_ENV_VAR: &str = "PAGENAV_LOG";
const DEFAULT_FILTER: &str = "pagenav=info,pagenav_app=info,warn";
const LOG_FILE_PREFIX: &str = "pagenav.log";

/// Where logs go and what gets through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub filter: String,
}

impl LogConfig {
    /// Local data directory, filter from `PAGENAV_LOG`
    pub fn from_env() -> Self {
        Self {
            directory: default_log_directory(),
            filter: std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Path of the file the appender writes to first
    pub fn log_file(&self) -> PathBuf {
        self.directory.join(LOG_FILE_PREFIX)
    }
}

/// Initialize logging with [`LogConfig::from_env`].
///
/// Logs are written to `~/.local/share/pagenav/logs/`. Keep the returned
/// guard alive until exit so buffered lines get flushed.
///
/// # Examples
/// ```bash
/// PAGENAV_LOG=debug pagenav --script nav.toml --log
/// PAGENAV_LOG=pagenav_app=trace pagenav --script nav.toml --log
/// ```
pub fn init() -> Result<WorkerGuard> {
    init_with(&LogConfig::from_env())
}

pub fn init_with(config: &LogConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    log_started(&config.directory);
    Ok(guard)
}

fn log_started(directory: &Path) {
    tracing::info!(
        "pagenav {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        directory.display()
    );
}

fn default_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("pagenav").join("logs")
}
