//! Health verdicts derived from process liveness and recent error output.

use crate::{ManagedProcess, RECENT_ERRORS_IN_DESCRIPTION};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded {
        error_count: usize,
        description: String,
    },
    Unhealthy {
        description: String,
    },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded { .. } => "degraded",
            HealthStatus::Unhealthy { .. } => "unhealthy",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Healthy => "Game server is running with no recent errors",
            HealthStatus::Degraded { description, .. } => description,
            HealthStatus::Unhealthy { description } => description,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.description())
    }
}

/// Pure verdict: not running beats any error count, then any recorded error degrades.
pub fn evaluate(is_running: bool, recent_errors: &[String]) -> HealthStatus {
    if !is_running {
        return HealthStatus::Unhealthy {
            description: "Game server process is not running".to_string(),
        };
    }

    if recent_errors.is_empty() {
        return HealthStatus::Healthy;
    }

    let tail_start = recent_errors
        .len()
        .saturating_sub(RECENT_ERRORS_IN_DESCRIPTION);
    HealthStatus::Degraded {
        error_count: recent_errors.len(),
        description: format!(
            "Game server reported {} recent error(s); latest: {}",
            recent_errors.len(),
            recent_errors[tail_start..].join(" | ")
        ),
    }
}

/// Sample a process and produce its verdict.
pub fn check<P: ManagedProcess + ?Sized>(process: &mut P) -> HealthStatus {
    let running = process.is_running();
    evaluate(running, &process.recent_errors())
}
