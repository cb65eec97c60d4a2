//! gsw - game server watchdog
//!
//! Installs and updates a Steam dedicated server with steamcmd, keeps it
//! running, and cycles it when it stays unhealthy or an update is due.
//!
//! # Examples
//!
//! ```bash
//! # Validate ./.gsw/config.toml and exit
//! gsw --check-config
//!
//! # Run a Valheim server, overriding where it lives
//! gsw --app-id 896660 --install-dir /srv/valheim \
//!     --executable-path valheim_server.x86_64 \
//!     --launch-arguments '-name "Viking Hall" -port 2456 -world Dedicated'
//! ```

use gsw_service::{cli::Cli, exit_codes, service};

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match service::run(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(e) => {
            // The logger may not be up yet (config errors), so always echo to stderr.
            error!("{e}");
            eprintln!("gsw: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
