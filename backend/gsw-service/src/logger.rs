use crate::error::{Result as ServiceErrorResult, ServiceError};
use crate::{LOG_FILE_PREFIX, LOG_FILE_SUFFIX, MAX_LOG_FILES};

use std::path::Path;

use gsw_config::LogLevel;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `log_level` - Default filter; `RUST_LOG` wins when set
/// * `log_dir` - Optional directory for daily rotated log files
/// * `colored` - ANSI colors on the console layer
///
/// `log` records from the config crate are bridged into the same subscriber.
#[track_caller]
pub fn initialize(
    log_level: LogLevel,
    log_dir: Option<&Path>,
    colored: bool,
) -> ServiceErrorResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(colored);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                ServiceError::logger(format!(
                    "cannot create log directory {}: {e}",
                    dir.display()
                ))
            })?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_FILES)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(dir)
                .map_err(|e| ServiceError::logger(e.to_string()))?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ServiceError::logger(e.to_string()))?;

    match log_dir {
        Some(dir) => info!(
            "Logger initialized: level={log_level}, console + {}",
            dir.display()
        ),
        None => info!("Logger initialized: level={log_level}, console"),
    }

    Ok(())
}
