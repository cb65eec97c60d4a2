use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[cfg(windows)]
use windows_sys::Win32::Foundation::ERROR_ELEVATION_REQUIRED;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Updater executable not found at {path} {location}")]
    UpdaterNotFound {
        path: PathBuf,
        location: ErrorLocation,
    },

    #[error("Launching {path} requires elevated privileges: {source} {location}")]
    ElevationRequired {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl SupervisorError {
    #[track_caller]
    pub fn updater_not_found(path: impl Into<PathBuf>) -> Self {
        Self::UpdaterNotFound {
            path: path.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn elevation_required(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ElevationRequired {
            path: path.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Fatal errors end the whole service; retrying identically cannot succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UpdaterNotFound { .. } | Self::ElevationRequired { .. }
        )
    }
}

/// Whether a spawn failure means the binary can only be launched with higher privileges.
///
/// Windows reports this as `ERROR_ELEVATION_REQUIRED` (740); elsewhere it surfaces
/// as a permission-denied exec.
pub(crate) fn is_elevation_required(err: &std::io::Error) -> bool {
    #[cfg(windows)]
    {
        err.raw_os_error() == Some(ERROR_ELEVATION_REQUIRED as i32)
    }

    #[cfg(not(windows))]
    {
        err.kind() == std::io::ErrorKind::PermissionDenied
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
