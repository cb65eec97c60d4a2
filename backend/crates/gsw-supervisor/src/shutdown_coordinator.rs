use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Graceful shutdown coordinator
///
/// The first request cancels [`token`](Self::token). A repeated request also
/// cancels [`force_token`](Self::force_token), cutting the final graceful stop short.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    force: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            force: CancellationToken::new(),
        }
    }

    /// Token that fires once shutdown is triggered
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Token that fires on the second shutdown request
    pub fn force_token(&self) -> CancellationToken {
        self.force.clone()
    }

    /// Child token: cancelled with the coordinator, but cancelling it does not propagate up
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger shutdown (call this from signal handler)
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown signal received, notifying all subsystems");
            self.token.cancel();
        } else if !self.force.is_cancelled() {
            warn!("Second shutdown signal received, skipping the graceful stop");
            self.force.cancel();
        }
    }

    /// Check if shutdown has been triggered (non-blocking)
    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once shutdown has been triggered
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
