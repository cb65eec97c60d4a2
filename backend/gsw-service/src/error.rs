use crate::exit_codes;

use std::panic::Location;

use error_location::ErrorLocation;
use gsw_config::ConfigError;
use gsw_supervisor::SupervisorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Failed to initialize logging: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}

impl ServiceError {
    #[track_caller]
    pub fn logger(message: impl Into<String>) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ServiceError::Config(_) => exit_codes::CONFIG_INVALID,
            ServiceError::Supervisor(SupervisorError::UpdaterNotFound { .. }) => {
                exit_codes::UPDATER_NOT_FOUND
            }
            ServiceError::Supervisor(SupervisorError::ElevationRequired { .. }) => {
                exit_codes::ELEVATION_REQUIRED
            }
            ServiceError::Supervisor(SupervisorError::Cancelled) | ServiceError::Logger { .. } => {
                exit_codes::FAILURE
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
