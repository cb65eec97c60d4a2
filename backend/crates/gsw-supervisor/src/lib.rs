//! Lifecycle supervision for a single dedicated game server process.
//!
//! The [`ControlLoop`] drives everything: it installs/updates the server via an
//! [`Updater`], starts it through a [`ManagedProcess`] (normally the
//! [`ProcessSupervisor`]), polls [`health::check`] on a fixed cadence and cycles
//! the process when it stays unhealthy or a scheduled update falls due.

mod control_loop;
mod error;
mod error_history;
pub mod health;
mod managed_process;
mod output_pump;
mod process_supervisor;
mod process_tree;
pub mod profile;
mod shutdown_coordinator;
mod supervisor_state;
mod updater;

#[cfg(test)]
mod tests;

pub use control_loop::ControlLoop;
pub use error::{Result as SupervisorResult, SupervisorError};
pub use error_history::ErrorHistory;
pub use health::HealthStatus;
pub use managed_process::ManagedProcess;
pub use process_supervisor::ProcessSupervisor;
pub use profile::{GameProfile, GenericProfile, ValheimProfile, profile_for};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use supervisor_state::SupervisorState;
pub use updater::{SteamCmdUpdater, Updater};

use std::time::Duration;

/// How long a stop request waits for a graceful exit before force-killing.
pub const GRACEFUL_STOP_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on reaping a process after it has been killed.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of recent error lines quoted in a degraded health description.
const RECENT_ERRORS_IN_DESCRIPTION: usize = 5;

/// Log target for lines echoed from the supervised process.
const GAME_SERVER_LOG_TARGET: &str = "game_server";

/// Log target for lines echoed from steamcmd.
const STEAMCMD_LOG_TARGET: &str = "steamcmd";
