mod config;
mod error;
mod game_server_config;
mod health_check_config;
mod log_level;
mod logging_config;
mod overrides;
mod profile_kind;
mod updater_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use game_server_config::GameServerConfig;
pub use health_check_config::HealthCheckConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use overrides::ConfigOverrides;
pub use profile_kind::ProfileKind;
pub use updater_config::UpdaterConfig;

const CONFIG_DIR_ENV: &str = "GSW_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = ".gsw";
const CONFIG_FILENAME: &str = "config.toml";

#[cfg(windows)]
const DEFAULT_STEAMCMD_PATH: &str = r"C:\steamcmd\steamcmd.exe";
#[cfg(not(windows))]
const DEFAULT_STEAMCMD_PATH: &str = "/usr/games/steamcmd";

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

// Health check
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
pub const MIN_MAX_CONSECUTIVE_FAILURES: u32 = 1;
pub const MAX_MAX_CONSECUTIVE_FAILURES: u32 = 100;

pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 30;
pub const MIN_CHECK_INTERVAL_SECONDS: u64 = 1;
pub const MAX_CHECK_INTERVAL_SECONDS: u64 = 3600;

pub const DEFAULT_ERROR_HISTORY_CAPACITY: usize = 50;
pub const MIN_ERROR_HISTORY_CAPACITY: usize = 1;
pub const MAX_ERROR_HISTORY_CAPACITY: usize = 10_000;

pub const DEFAULT_ERROR_PATTERNS: [&str; 4] = ["error", "exception", "crash", "fatal"];

// Game server
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 10_080;
