use crate::cli::Cli;
use crate::{ServiceResult, logger, signals};

use std::path::PathBuf;

use gsw_config::Config;
use gsw_supervisor::{
    ControlLoop, ProcessSupervisor, ShutdownCoordinator, SteamCmdUpdater, profile_for,
};
use tracing::info;

/// Load configuration for `cli` and resolve the log directory against the config directory.
pub fn load_config(cli: &Cli) -> ServiceResult<(Config, Option<PathBuf>)> {
    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };

    let config = Config::load_with_overrides(Some(config_dir.as_path()), cli.overrides())?;
    config.validate()?;

    let log_dir = config.logging.dir.as_ref().map(|dir| config_dir.join(dir));

    Ok((config, log_dir))
}

/// Entry point behind `main`: returns once the game server has been stopped.
pub async fn run(cli: Cli) -> ServiceResult<()> {
    let (config, log_dir) = load_config(&cli)?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        log_dir.as_deref(),
        config.logging.colored,
    )?;

    info!("Starting gsw v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    if cli.check_config {
        info!("Configuration is valid");
        return Ok(());
    }

    let shutdown = ShutdownCoordinator::new();
    signals::install(shutdown.clone());

    let updater = SteamCmdUpdater::from_config(&config.updater);
    let process = ProcessSupervisor::new(
        profile_for(config.game_server.profile),
        config.health_check.error_history_capacity,
    );
    let control = ControlLoop::new(
        config.game_server,
        config.health_check,
        updater,
        process,
    );

    control
        .run(shutdown.token(), shutdown.force_token())
        .await?;

    info!("gsw stopped");
    Ok(())
}
