use crate::{ErrorHistory, GAME_SERVER_LOG_TARGET, GameProfile, STEAMCMD_LOG_TARGET};

use std::fmt;
use std::sync::Arc;

use gsw_config::HealthCheckConfig;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Feed each line of `reader` to `on_line` until EOF.
///
/// Bytes are decoded lossily so a stray non-UTF-8 byte cannot kill the reader.
pub(crate) async fn read_lines<R, F>(reader: R, stream: Stream, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                on_line(line.trim_end_matches(['\r', '\n']));
            }
            Err(e) => {
                debug!("{stream} reader stopped: {e}");
                break;
            }
        }
    }
}

/// Echo and classify one line of game server output.
///
/// Returns true when the line was recorded as an error. Stdout lines go
/// through the profile's classifier; every stderr line counts.
pub(crate) fn handle_game_line(
    line: &str,
    stream: Stream,
    profile: &dyn GameProfile,
    health: &HealthCheckConfig,
    errors: &ErrorHistory,
) -> bool {
    if line.trim().is_empty() {
        return false;
    }

    let is_error = match stream {
        Stream::Stdout => {
            info!(target: GAME_SERVER_LOG_TARGET, "{line}");
            profile.is_error_line(line, health)
        }
        Stream::Stderr => {
            warn!(target: GAME_SERVER_LOG_TARGET, "{line}");
            true
        }
    };

    if is_error {
        errors.push(line);
    }
    is_error
}

pub(crate) fn spawn_game_pump<R>(
    reader: R,
    stream: Stream,
    profile: Arc<dyn GameProfile>,
    health: Arc<HealthCheckConfig>,
    errors: ErrorHistory,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        read_lines(reader, stream, |line| {
            handle_game_line(line, stream, profile.as_ref(), &health, &errors);
        })
        .await;
    })
}

pub(crate) fn spawn_steamcmd_pump<R>(reader: R, stream: Stream) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        read_lines(reader, stream, |line| {
            if line.trim().is_empty() {
                return;
            }
            match stream {
                Stream::Stdout => info!(target: STEAMCMD_LOG_TARGET, "{line}"),
                Stream::Stderr => warn!(target: STEAMCMD_LOG_TARGET, "{line}"),
            }
        })
        .await;
    })
}
