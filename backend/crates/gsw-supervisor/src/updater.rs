use crate::output_pump::{Stream, spawn_steamcmd_pump};
use crate::{REAP_TIMEOUT, SupervisorError, SupervisorResult, process_tree};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use gsw_config::UpdaterConfig;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long both output readers together may drain after steamcmd exits.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Installs or updates the game server files.
#[async_trait]
pub trait Updater: Send + Sync {
    /// Fails with [`SupervisorError::UpdaterNotFound`] when the tool is missing.
    fn validate(&self) -> SupervisorResult<()>;

    /// Run one update pass. `Ok(false)` on any non-fatal failure,
    /// `Err(Cancelled)` when `cancel` fires mid-run.
    async fn update_or_install(
        &self,
        app_id: u32,
        install_dir: &Path,
        cancel: &CancellationToken,
    ) -> SupervisorResult<bool>;
}

/// Drives SteamCMD with an anonymous login.
#[derive(Debug, Clone)]
pub struct SteamCmdUpdater {
    steamcmd_path: PathBuf,
}

impl SteamCmdUpdater {
    pub fn new(steamcmd_path: impl Into<PathBuf>) -> Self {
        Self {
            steamcmd_path: steamcmd_path.into(),
        }
    }

    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(&config.steamcmd_path)
    }

    /// `force_install_dir` must precede `app_update`, and login must come first.
    pub fn arguments(app_id: u32, install_dir: &Path) -> Vec<OsString> {
        vec![
            "+login".into(),
            "anonymous".into(),
            "+force_install_dir".into(),
            install_dir.as_os_str().to_os_string(),
            "+app_update".into(),
            app_id.to_string().into(),
            "validate".into(),
            "+quit".into(),
        ]
    }
}

#[async_trait]
impl Updater for SteamCmdUpdater {
    fn validate(&self) -> SupervisorResult<()> {
        if self.steamcmd_path.is_file() {
            Ok(())
        } else {
            Err(SupervisorError::updater_not_found(&self.steamcmd_path))
        }
    }

    async fn update_or_install(
        &self,
        app_id: u32,
        install_dir: &Path,
        cancel: &CancellationToken,
    ) -> SupervisorResult<bool> {
        if cancel.is_cancelled() {
            return Err(SupervisorError::Cancelled);
        }

        if let Err(e) = tokio::fs::create_dir_all(install_dir).await {
            error!(
                "Failed to create install directory {}: {e}",
                install_dir.display()
            );
            return Ok(false);
        }

        info!(
            "Updating app {app_id} into {} with {}",
            install_dir.display(),
            self.steamcmd_path.display()
        );

        let mut cmd = Command::new(&self.steamcmd_path);
        cmd.args(Self::arguments(app_id, install_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process_tree::configure_command(&mut cmd);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(
                    "Failed to launch steamcmd at {}: {e}",
                    self.steamcmd_path.display()
                );
                return Ok(false);
            }
        };

        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(spawn_steamcmd_pump(stdout, Stream::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(spawn_steamcmd_pump(stderr, Stream::Stderr));
        }

        let pid = child.id();
        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                warn!("Update of app {app_id} cancelled; terminating steamcmd");
                if let Some(pid) = pid
                    && let Err(e) = process_tree::kill_tree(pid)
                {
                    warn!("Failed to kill steamcmd tree {pid}: {e}");
                }
                child.start_kill().ok();
                tokio::time::timeout(REAP_TIMEOUT, child.wait()).await.ok();
                for pump in pumps {
                    pump.abort();
                }
                return Err(SupervisorError::Cancelled);
            }
        };

        // Helpers steamcmd left behind in its group still hold the output pipes.
        if let Some(pid) = pid
            && let Err(e) = process_tree::kill_tree(pid)
        {
            warn!("Failed to kill leftover steamcmd processes in group {pid}: {e}");
        }
        drain_pumps(pumps).await;

        match status {
            Ok(status) if status.success() => {
                info!("steamcmd finished updating app {app_id}");
                Ok(true)
            }
            Ok(status) => {
                warn!("steamcmd failed to update app {app_id} ({status})");
                Ok(false)
            }
            Err(e) => {
                error!("Failed waiting for steamcmd: {e}");
                Ok(false)
            }
        }
    }
}

/// Wait for the readers under one shared deadline, then abort whatever is left.
async fn drain_pumps(mut pumps: Vec<JoinHandle<()>>) {
    let deadline = tokio::time::Instant::now() + OUTPUT_DRAIN_TIMEOUT;
    for pump in pumps.iter_mut() {
        if tokio::time::timeout_at(deadline, pump).await.is_err() {
            warn!(
                "steamcmd output still open {}s after exit; abandoning it",
                OUTPUT_DRAIN_TIMEOUT.as_secs()
            );
            break;
        }
    }
    for pump in pumps {
        pump.abort();
    }
}
