use crate::{ConfigError, ConfigErrorResult, MAX_UPDATE_INTERVAL_MINUTES, ProfileKind};

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameServerConfig {
    /// Steam application id passed to the updater
    pub app_id: u32,
    /// Target directory for the updater and base for a relative executable path
    pub install_dir: PathBuf,
    /// Absolute, or relative to `install_dir`
    pub executable_path: PathBuf,
    /// Passed to the server verbatim, split with shell-word rules
    pub launch_arguments: String,
    /// Periodic stop/update/start cadence (0 = disabled)
    pub update_interval_minutes: u64,
    pub profile: ProfileKind,
}

impl GameServerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.app_id == 0 {
            return Err(ConfigError::game_server(
                "game_server.app_id must be set to a non-zero Steam application id",
            ));
        }

        if self.install_dir.as_os_str().is_empty() {
            return Err(ConfigError::game_server(
                "game_server.install_dir must not be empty",
            ));
        }

        if self.executable_path.as_os_str().is_empty() {
            return Err(ConfigError::game_server(
                "game_server.executable_path must not be empty",
            ));
        }

        self.split_launch_arguments()?;

        if self.update_interval_minutes > MAX_UPDATE_INTERVAL_MINUTES {
            return Err(ConfigError::game_server(format!(
                "game_server.update_interval_minutes must be 0-{}, got {}",
                MAX_UPDATE_INTERVAL_MINUTES, self.update_interval_minutes
            )));
        }

        Ok(())
    }

    /// Absolute executable paths are used as-is, relative ones resolve against `install_dir`.
    pub fn resolved_executable(&self) -> PathBuf {
        if self.executable_path.is_absolute() {
            self.executable_path.clone()
        } else {
            self.install_dir.join(&self.executable_path)
        }
    }

    /// `None` when periodic updates are disabled.
    pub fn update_interval(&self) -> Option<Duration> {
        (self.update_interval_minutes > 0)
            .then(|| Duration::from_secs(self.update_interval_minutes.saturating_mul(60)))
    }

    pub fn split_launch_arguments(&self) -> ConfigErrorResult<Vec<String>> {
        shlex::split(&self.launch_arguments).ok_or_else(|| {
            ConfigError::game_server(format!(
                "game_server.launch_arguments has unbalanced quoting: {}",
                self.launch_arguments
            ))
        })
    }
}
