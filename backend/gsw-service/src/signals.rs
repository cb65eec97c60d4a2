use gsw_supervisor::ShutdownCoordinator;

use tracing::{error, info};

/// Route SIGINT/SIGTERM (Unix) or Ctrl+C (Windows) to `shutdown`. A repeated
/// signal escalates to skipping the graceful stop.
pub fn install(shutdown: ShutdownCoordinator) {
    #[cfg(unix)]
    {
        std::thread::spawn(move || {
            use signal_hook::consts::{SIGINT, SIGTERM};
            use signal_hook::iterator::Signals;

            let mut signals = match Signals::new([SIGINT, SIGTERM]) {
                Ok(s) => s,
                Err(e) => {
                    error!("Failed to register signal handlers: {e}");
                    return;
                }
            };

            for sig in signals.forever() {
                info!("Received signal {sig}, initiating graceful shutdown");
                shutdown.shutdown();
            }
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            loop {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C, initiating graceful shutdown");
                        shutdown.shutdown();
                    }
                    Err(e) => {
                        error!("Failed to listen for Ctrl+C: {e}");
                        return;
                    }
                }
            }
        });
    }
}
