use crate::DEFAULT_STEAMCMD_PATH;

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Location of the steamcmd executable, checked at startup
    pub steamcmd_path: PathBuf,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            steamcmd_path: PathBuf::from(DEFAULT_STEAMCMD_PATH),
        }
    }
}
