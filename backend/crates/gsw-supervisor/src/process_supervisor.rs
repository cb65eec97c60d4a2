use crate::error::is_elevation_required;
use crate::output_pump::{Stream, spawn_game_pump};
use crate::{
    ErrorHistory, GRACEFUL_STOP_TIMEOUT, GameProfile, ManagedProcess, REAP_TIMEOUT,
    SupervisorError, SupervisorResult, SupervisorState, process_tree,
};

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gsw_config::{GameServerConfig, HealthCheckConfig};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Owns at most one running game server process plus the tasks reading its output.
pub struct ProcessSupervisor {
    profile: Arc<dyn GameProfile>,
    errors: ErrorHistory,
    child: Option<Child>,
    pumps: Vec<JoinHandle<()>>,
    state: SupervisorState,
    grace_period: Duration,
}

impl ProcessSupervisor {
    pub fn new(profile: Arc<dyn GameProfile>, error_history_capacity: usize) -> Self {
        Self {
            profile,
            errors: ErrorHistory::new(error_history_capacity),
            child: None,
            pumps: Vec::new(),
            state: SupervisorState::Idle,
            grace_period: GRACEFUL_STOP_TIMEOUT,
        }
    }

    /// Override how long `stop` waits before force-killing.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// OS process id while a process is tracked.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Best-effort synchronous teardown. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait()
                && let Some(pid) = child.id()
            {
                warn!("Disposing supervisor with game server {pid} still running; killing tree");
                if let Err(e) = process_tree::kill_tree(pid) {
                    warn!("Failed to kill process tree {pid}: {e}");
                }
                child.start_kill().ok();
            }
        }
        self.abort_pumps();
        self.state = SupervisorState::Idle;
    }

    fn abort_pumps(&mut self) {
        for pump in self.pumps.drain(..) {
            pump.abort();
        }
    }

    fn working_dir(executable: &Path, game: &GameServerConfig) -> PathBuf {
        executable
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| game.install_dir.clone())
    }

    async fn force_kill(child: &mut Child) {
        if let Some(pid) = child.id()
            && let Err(e) = process_tree::kill_tree(pid)
        {
            warn!("Failed to kill process tree {pid}: {e}");
        }
        if let Err(e) = child.start_kill() {
            debug!("Direct kill after tree kill failed: {e}");
        }

        match tokio::time::timeout(REAP_TIMEOUT, child.wait()).await {
            Ok(Ok(status)) => info!("Game server terminated ({status})"),
            Ok(Err(e)) => warn!("Failed to reap killed game server: {e}"),
            Err(_) => warn!(
                "Game server not reaped within {}s of being killed",
                REAP_TIMEOUT.as_secs()
            ),
        }
    }
}

#[async_trait]
impl ManagedProcess for ProcessSupervisor {
    async fn start(
        &mut self,
        game: &GameServerConfig,
        health: &HealthCheckConfig,
        cancel: &CancellationToken,
    ) -> SupervisorResult<bool> {
        if cancel.is_cancelled() {
            return Err(SupervisorError::Cancelled);
        }

        if self.is_running() {
            warn!("Start requested while the game server is still running; stopping it first");
            self.stop(cancel).await;
        }
        if let Some(mut stale) = self.child.take() {
            warn!("Reclaiming a game server handle whose status is unknown; killing it");
            Self::force_kill(&mut stale).await;
        }
        self.abort_pumps();

        let executable = game.resolved_executable();
        if !executable.is_file() {
            error!(
                "Game server executable not found at {}",
                executable.display()
            );
            return Ok(false);
        }

        self.errors.clear();
        self.state = SupervisorState::Starting;

        let args = self.profile.build_launch_arguments(game);
        let working_dir = Self::working_dir(&executable, game);

        info!(
            "Starting game server: {} {} (cwd {})",
            executable.display(),
            args.join(" "),
            working_dir.display()
        );

        let mut cmd = Command::new(&executable);
        cmd.args(&args)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process_tree::configure_command(&mut cmd);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if is_elevation_required(&e) => {
                self.state = SupervisorState::Idle;
                error!(
                    "Game server {} requires elevated privileges: {e}",
                    executable.display()
                );
                return Err(SupervisorError::elevation_required(executable, e));
            }
            Err(e) => {
                self.state = SupervisorState::Idle;
                error!("Failed to start game server {}: {e}", executable.display());
                return Ok(false);
            }
        };

        let health = Arc::new(health.clone());
        if let Some(stdout) = child.stdout.take() {
            self.pumps.push(spawn_game_pump(
                stdout,
                Stream::Stdout,
                Arc::clone(&self.profile),
                Arc::clone(&health),
                self.errors.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            self.pumps.push(spawn_game_pump(
                stderr,
                Stream::Stderr,
                Arc::clone(&self.profile),
                health,
                self.errors.clone(),
            ));
        }

        let pid = child.id();
        self.child = Some(child);
        self.state = SupervisorState::Running;

        info!(
            "Game server started ({} profile, pid {})",
            self.profile.name(),
            pid.map_or_else(|| "unknown".to_string(), |p| p.to_string())
        );
        self.profile.on_started(pid);

        Ok(true)
    }

    async fn stop(&mut self, cancel: &CancellationToken) {
        let Some(mut child) = self.child.take() else {
            info!("No game server process to stop");
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                info!("Game server already exited ({status})");
                self.state = SupervisorState::Idle;
                return;
            }
            Ok(None) => {}
            Err(e) => debug!("Could not poll game server status: {e}"),
        }

        self.state = SupervisorState::Stopping;
        let pid = child.id();
        self.profile.on_stopping(pid);

        let close_requested = match pid {
            Some(pid) => match process_tree::request_graceful_close(pid) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Graceful close request to pid {pid} failed: {e}");
                    false
                }
            },
            None => false,
        };

        let exited = close_requested
            && tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => {
                        info!("Game server exited gracefully ({status})");
                        true
                    }
                    Err(e) => {
                        warn!("Failed waiting for game server to exit: {e}");
                        false
                    }
                },
                _ = tokio::time::sleep(self.grace_period) => {
                    warn!(
                        "Game server did not exit within {}s; force killing",
                        self.grace_period.as_secs()
                    );
                    false
                }
                _ = cancel.cancelled() => {
                    warn!("Stop cancelled; force killing game server");
                    false
                }
            };

        if !exited {
            Self::force_kill(&mut child).await;
        }

        self.state = SupervisorState::Idle;
    }

    fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!("Game server exited unexpectedly ({status})");
                self.child = None;
                self.state = SupervisorState::Idle;
                false
            }
            Err(e) => {
                warn!("Could not poll game server status: {e}");
                false
            }
        }
    }

    fn recent_errors(&self) -> Vec<String> {
        self.errors.snapshot()
    }

    fn clear_errors(&self) {
        self.errors.clear();
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.dispose();
    }
}
