//! Process exit statuses. Anything non-zero means the service gave up
//! deliberately; a supervisor such as systemd should not restart it blindly
//! for 2-4, since the same configuration will fail the same way.

pub const SUCCESS: u8 = 0;

/// Startup failure not covered below (e.g. logger could not be installed).
pub const FAILURE: u8 = 1;

pub const CONFIG_INVALID: u8 = 2;

/// steamcmd is not at the configured path.
pub const UPDATER_NOT_FOUND: u8 = 3;

/// The game server binary can only be launched with elevated privileges.
pub const ELEVATION_REQUIRED: u8 = 4;
