use std::fmt;

/// Current state of the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    /// No process is tracked
    #[default]
    Idle,
    /// Spawn in progress
    Starting,
    /// Process launched and not yet observed to exit
    Running,
    /// Graceful stop or force kill in progress
    Stopping,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::Stopping => "stopping",
        };
        f.write_str(label)
    }
}
