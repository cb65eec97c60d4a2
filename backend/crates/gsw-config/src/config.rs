use crate::{
    CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult, ConfigOverrides,
    DEFAULT_CONFIG_DIR, GameServerConfig, HealthCheckConfig, LoggingConfig, UpdaterConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub updater: UpdaterConfig,
    pub game_server: GameServerConfig,
    pub health_check: HealthCheckConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for GSW_CONFIG_DIR env var, else use ./.gsw/
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply GSW_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        Self::load_from(&Self::config_dir()?)
    }

    /// Load config from an explicit directory, then apply command line overrides on top.
    pub fn load_with_overrides(
        config_dir: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> ConfigErrorResult<Self> {
        let mut config = match config_dir {
            Some(dir) => Self::load_from(dir)?,
            None => Self::load()?,
        };
        overrides.apply(&mut config);
        Ok(config)
    }

    /// Load `config.toml` from `config_dir` (missing file = defaults) and apply env overrides.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: GSW_CONFIG_DIR env var > ./.gsw/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.updater.steamcmd_path.as_os_str().is_empty() {
            return Err(ConfigError::config("updater.steamcmd_path must not be empty"));
        }

        self.game_server.validate()?;
        self.health_check.validate()?;

        if let Some(ref dir) = self.logging.dir
            && dir.trim().is_empty()
        {
            return Err(ConfigError::logging("logging.dir must not be blank when set"));
        }

        Ok(())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  updater: {}", self.updater.steamcmd_path.display());
        info!(
            "  game_server: app {} ({} profile) in {}",
            self.game_server.app_id,
            self.game_server.profile,
            self.game_server.install_dir.display()
        );
        info!(
            "  executable: {} {}",
            self.game_server.resolved_executable().display(),
            self.game_server.launch_arguments
        );

        match self.game_server.update_interval_minutes {
            0 => info!("  scheduled updates: disabled"),
            minutes => info!("  scheduled updates: every {minutes}m"),
        }

        info!(
            "  health_check: every {}s, restart after {} failures, history {}",
            self.health_check.check_interval_seconds,
            self.health_check.max_consecutive_failures,
            self.health_check.error_history_capacity
        );
        info!(
            "  error_patterns: {}",
            self.health_check.error_patterns.join(", ")
        );
        info!(
            "  logging: {} (dir: {}, colored: {})",
            self.logging.level,
            self.logging.dir.as_deref().unwrap_or("none"),
            self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) -> ConfigErrorResult<()> {
        // Updater
        Self::apply_env_path("GSW_STEAMCMD_PATH", &mut self.updater.steamcmd_path);

        // Game server
        Self::apply_env_parse("GSW_APP_ID", &mut self.game_server.app_id);
        Self::apply_env_path("GSW_INSTALL_DIR", &mut self.game_server.install_dir);
        Self::apply_env_path("GSW_EXECUTABLE_PATH", &mut self.game_server.executable_path);
        Self::apply_env_string(
            "GSW_LAUNCH_ARGUMENTS",
            &mut self.game_server.launch_arguments,
        );
        Self::apply_env_parse(
            "GSW_UPDATE_INTERVAL_MINUTES",
            &mut self.game_server.update_interval_minutes,
        );
        if let Ok(val) = std::env::var("GSW_PROFILE") {
            self.game_server.profile = val.parse()?;
        }

        // Health check
        Self::apply_env_parse(
            "GSW_MAX_CONSECUTIVE_FAILURES",
            &mut self.health_check.max_consecutive_failures,
        );
        Self::apply_env_parse(
            "GSW_CHECK_INTERVAL_SECONDS",
            &mut self.health_check.check_interval_seconds,
        );
        if let Ok(val) = std::env::var("GSW_ERROR_PATTERNS") {
            self.health_check.error_patterns = val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        // Logging
        if let Ok(val) = std::env::var("GSW_LOG_LEVEL") {
            self.logging.level = val.parse()?;
        }
        Self::apply_env_option_string("GSW_LOG_DIR", &mut self.logging.dir);
        Self::apply_env_bool("GSW_LOG_COLORED", &mut self.logging.colored);

        Ok(())
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for PathBuf values
    fn apply_env_path(var_name: &str, target: &mut PathBuf) {
        if let Ok(val) = std::env::var(var_name) {
            *target = PathBuf::from(val);
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
