use crate::ConfigError;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which game-specific behaviour to layer on top of the generic supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Generic,
    Valheim,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Generic => write!(f, "generic"),
            ProfileKind::Valheim => write!(f, "valheim"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(ProfileKind::Generic),
            "valheim" => Ok(ProfileKind::Valheim),
            other => Err(ConfigError::game_server(format!(
                "unknown profile '{other}' (expected generic or valheim)"
            ))),
        }
    }
}
