use crate::{HealthStatus, ManagedProcess, SupervisorError, SupervisorResult, Updater, health};

use gsw_config::{GameServerConfig, HealthCheckConfig};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Ties updater, process and health checks together for one game server.
///
/// Owns the consecutive-failure counter and the time of the last completed
/// update cycle. Every health verdict is published on a watch channel.
pub struct ControlLoop<U, P> {
    game: GameServerConfig,
    health: HealthCheckConfig,
    updater: U,
    process: P,
    consecutive_failures: u32,
    last_update: Instant,
    health_tx: watch::Sender<HealthStatus>,
}

impl<U: Updater, P: ManagedProcess> ControlLoop<U, P> {
    /// A zero failure threshold is raised to one so a healthy poll never cycles the server.
    pub fn new(
        game: GameServerConfig,
        mut health: HealthCheckConfig,
        updater: U,
        process: P,
    ) -> Self {
        if health.max_consecutive_failures == 0 {
            warn!("max_consecutive_failures is 0; treating it as 1");
            health.max_consecutive_failures = 1;
        }
        let (health_tx, _) = watch::channel(HealthStatus::default());
        Self {
            game,
            health,
            updater,
            process,
            consecutive_failures: 0,
            last_update: Instant::now(),
            health_tx,
        }
    }

    /// Receive every verdict produced by [`ControlLoop::tick`].
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.health_tx.subscribe()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Run until `cancel` fires or a fatal error occurs.
    ///
    /// The game server is always stopped before returning; `force_stop` cuts that
    /// final graceful stop short. Cancellation is a normal exit; fatal errors are
    /// returned to the caller.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        force_stop: CancellationToken,
    ) -> SupervisorResult<()> {
        let result = self.supervise(&cancel).await;

        match &result {
            Ok(()) | Err(SupervisorError::Cancelled) => {
                info!("Control loop stopping; shutting down game server")
            }
            Err(e) => error!("Control loop failed: {e}"),
        }

        // `cancel` has already fired, so the stop races `force_stop` instead.
        self.process.stop(&force_stop).await;
        info!("Control loop finished");

        match result {
            Err(SupervisorError::Cancelled) => Ok(()),
            other => other,
        }
    }

    async fn supervise(&mut self, cancel: &CancellationToken) -> SupervisorResult<()> {
        self.updater.validate()?;
        self.initialize(cancel).await?;

        let interval = self.health.check_interval();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }
            self.tick(cancel).await?;
        }
    }

    /// Initial update followed by the first start.
    pub async fn initialize(&mut self, cancel: &CancellationToken) -> SupervisorResult<()> {
        info!(
            "Initializing game server (app {}, {} profile)",
            self.game.app_id, self.game.profile
        );
        self.update_and_start(cancel).await?;
        self.last_update = Instant::now();
        Ok(())
    }

    /// One health check followed by the restart and scheduled-update decisions.
    ///
    /// Whether an update is due is decided when the tick begins, so a restart
    /// does not postpone an update that was already due and both cycles can
    /// run back to back.
    pub async fn tick(&mut self, cancel: &CancellationToken) -> SupervisorResult<()> {
        let update_due = self.update_due();
        let status = health::check(&mut self.process);
        self.record_verdict(&status);
        self.health_tx.send_replace(status);

        if self.consecutive_failures >= self.health.max_consecutive_failures {
            warn!(
                "Game server failed {} consecutive health checks; restarting",
                self.consecutive_failures
            );
            self.process.stop(cancel).await;
            self.process.clear_errors();
            self.consecutive_failures = 0;
            self.update_and_start(cancel).await?;
            self.last_update = Instant::now();
        }

        if update_due {
            info!("Scheduled update due; cycling game server");
            self.process.stop(cancel).await;
            self.update_and_start(cancel).await?;
            self.last_update = Instant::now();
        }

        Ok(())
    }

    fn update_due(&self) -> bool {
        self.game
            .update_interval()
            .is_some_and(|interval| self.last_update.elapsed() >= interval)
    }

    fn record_verdict(&mut self, status: &HealthStatus) {
        let max = self.health.max_consecutive_failures;
        match status {
            HealthStatus::Healthy => {
                if self.consecutive_failures > 0 {
                    info!(
                        "Game server healthy again after {} failed checks",
                        self.consecutive_failures
                    );
                } else {
                    debug!("Health check: healthy");
                }
                self.consecutive_failures = 0;
            }
            HealthStatus::Degraded { description, .. } => {
                self.consecutive_failures += 1;
                warn!(
                    "Health check degraded ({}/{max}): {description}",
                    self.consecutive_failures
                );
            }
            HealthStatus::Unhealthy { description } => {
                self.consecutive_failures += 1;
                error!(
                    "Health check unhealthy ({}/{max}): {description}",
                    self.consecutive_failures
                );
            }
        }
    }

    /// Update failures are logged and the start is still attempted against the
    /// files already on disk. Returns whether the start succeeded.
    async fn update_and_start(&mut self, cancel: &CancellationToken) -> SupervisorResult<bool> {
        let updated = self
            .updater
            .update_or_install(self.game.app_id, &self.game.install_dir, cancel)
            .await?;
        if !updated {
            warn!(
                "Update of app {} failed; starting with the installed files",
                self.game.app_id
            );
        }

        let started = self.process.start(&self.game, &self.health, cancel).await?;
        if !started {
            error!("Game server failed to start; health checks will retry");
        }

        Ok(started)
    }
}
