//! Game-specific behaviour layered over the generic supervisor.

use std::sync::Arc;

use gsw_config::{GameServerConfig, HealthCheckConfig, ProfileKind};
use tracing::{info, warn};

/// Hooks a game can override. Every method has a generic default.
pub trait GameProfile: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_launch_arguments(&self, config: &GameServerConfig) -> Vec<String> {
        default_launch_arguments(config)
    }

    fn is_error_line(&self, line: &str, config: &HealthCheckConfig) -> bool {
        default_is_error_line(line, &config.error_patterns)
    }

    fn on_started(&self, _pid: Option<u32>) {}

    fn on_stopping(&self, _pid: Option<u32>) {}
}

/// Split the configured argument string with shell-word rules.
///
/// Config validation already rejects unbalanced quoting, so the whitespace
/// fallback only covers configs built without going through `validate()`.
pub fn default_launch_arguments(config: &GameServerConfig) -> Vec<String> {
    config.split_launch_arguments().unwrap_or_else(|e| {
        warn!("{e}; falling back to whitespace splitting");
        config
            .launch_arguments
            .split_whitespace()
            .map(String::from)
            .collect()
    })
}

/// Case-insensitive substring match against any configured pattern.
pub fn default_is_error_line(line: &str, patterns: &[String]) -> bool {
    let line = line.to_lowercase();
    patterns
        .iter()
        .any(|pattern| line.contains(&pattern.to_lowercase()))
}

pub fn profile_for(kind: ProfileKind) -> Arc<dyn GameProfile> {
    match kind {
        ProfileKind::Generic => Arc::new(GenericProfile),
        ProfileKind::Valheim => Arc::new(ValheimProfile),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericProfile;

impl GameProfile for GenericProfile {
    fn name(&self) -> &'static str {
        "generic"
    }
}

/// Valheim dedicated server (Steam app 896660).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValheimProfile;

impl ValheimProfile {
    /// The dedicated server tries to open a window without these.
    const REQUIRED_FLAGS: [&'static str; 2] = ["-nographics", "-batchmode"];

    /// Messages the server logs without any of the generic keywords.
    const EXTRA_ERROR_PATTERNS: [&'static str; 4] = [
        "failed to",
        "steam is not initialized",
        "out of memory",
        "zdos are missing",
    ];
}

impl GameProfile for ValheimProfile {
    fn name(&self) -> &'static str {
        "valheim"
    }

    fn build_launch_arguments(&self, config: &GameServerConfig) -> Vec<String> {
        let mut args = default_launch_arguments(config);
        for flag in Self::REQUIRED_FLAGS.iter().rev() {
            if !args.iter().any(|a| a.eq_ignore_ascii_case(flag)) {
                args.insert(0, flag.to_string());
            }
        }
        args
    }

    fn is_error_line(&self, line: &str, config: &HealthCheckConfig) -> bool {
        let lower = line.to_lowercase();
        Self::EXTRA_ERROR_PATTERNS
            .iter()
            .any(|pattern| lower.contains(pattern))
            || default_is_error_line(line, &config.error_patterns)
    }

    fn on_started(&self, pid: Option<u32>) {
        info!(
            ?pid,
            "Valheim server launched; world load can take several minutes"
        );
    }

    fn on_stopping(&self, pid: Option<u32>) {
        info!(?pid, "Asking Valheim server to save the world and exit");
    }
}
