use crate::SupervisorResult;

use async_trait::async_trait;
use gsw_config::{GameServerConfig, HealthCheckConfig};
use tokio_util::sync::CancellationToken;

/// The process operations the control loop depends on.
#[async_trait]
pub trait ManagedProcess: Send {
    /// Launch the server. `Ok(false)` for recoverable failures (missing
    /// executable, spawn error), `Err` for fatal ones or cancellation.
    async fn start(
        &mut self,
        game: &GameServerConfig,
        health: &HealthCheckConfig,
        cancel: &CancellationToken,
    ) -> SupervisorResult<bool>;

    /// Stop gracefully, escalating to a tree kill. Never fails.
    async fn stop(&mut self, cancel: &CancellationToken);

    fn is_running(&mut self) -> bool;

    fn recent_errors(&self) -> Vec<String>;

    fn clear_errors(&self);
}
