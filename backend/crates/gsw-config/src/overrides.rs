use crate::Config;

use std::path::PathBuf;

/// Values supplied on the command line. Applied after the config file and
/// `GSW_*` environment variables, so anything set here wins.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub steamcmd_path: Option<PathBuf>,
    pub app_id: Option<u32>,
    pub install_dir: Option<PathBuf>,
    pub executable_path: Option<PathBuf>,
    pub launch_arguments: Option<String>,
    pub update_interval_minutes: Option<u64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.steamcmd_path.is_none()
            && self.app_id.is_none()
            && self.install_dir.is_none()
            && self.executable_path.is_none()
            && self.launch_arguments.is_none()
            && self.update_interval_minutes.is_none()
    }

    pub fn apply(self, config: &mut Config) {
        if let Some(path) = self.steamcmd_path {
            config.updater.steamcmd_path = path;
        }
        if let Some(app_id) = self.app_id {
            config.game_server.app_id = app_id;
        }
        if let Some(dir) = self.install_dir {
            config.game_server.install_dir = dir;
        }
        if let Some(path) = self.executable_path {
            config.game_server.executable_path = path;
        }
        if let Some(args) = self.launch_arguments {
            config.game_server.launch_arguments = args;
        }
        if let Some(minutes) = self.update_interval_minutes {
            config.game_server.update_interval_minutes = minutes;
        }
    }
}
