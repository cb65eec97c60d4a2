use std::path::PathBuf;

use clap::Parser;
use gsw_config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "gsw")]
#[command(about = "Keeps a Steam dedicated game server installed, updated and running")]
#[command(version)]
pub struct Cli {
    /// Directory holding config.toml (default: $GSW_CONFIG_DIR, else ./.gsw)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Path to the steamcmd executable
    #[arg(long, value_name = "PATH")]
    pub steamcmd_path: Option<PathBuf>,

    /// Steam application id of the dedicated server
    #[arg(long)]
    pub app_id: Option<u32>,

    /// Directory steamcmd installs the server into
    #[arg(long, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Server executable, absolute or relative to the install directory
    #[arg(long, value_name = "PATH")]
    pub executable_path: Option<PathBuf>,

    /// Arguments passed to the server, split with shell quoting rules
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub launch_arguments: Option<String>,

    /// Minutes between scheduled update cycles (0 disables)
    #[arg(long, value_name = "MINUTES")]
    pub update_interval_minutes: Option<u64>,

    /// Load and validate configuration, log the summary, then exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            steamcmd_path: self.steamcmd_path.clone(),
            app_id: self.app_id,
            install_dir: self.install_dir.clone(),
            executable_path: self.executable_path.clone(),
            launch_arguments: self.launch_arguments.clone(),
            update_interval_minutes: self.update_interval_minutes,
        }
    }
}
