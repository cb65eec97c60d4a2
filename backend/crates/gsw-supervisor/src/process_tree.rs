//! Platform plumbing for launching a process in its own group and tearing down
//! the whole tree it spawns.

use std::io;

use tokio::process::Command;
use tracing::info;

#[cfg(windows)]
use windows_sys::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, CREATE_NO_WINDOW};

/// Put the child in a fresh process group so signals reach its descendants and
/// a console Ctrl-C aimed at us does not.
pub(crate) fn configure_command(cmd: &mut Command) {
    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        cmd.creation_flags(CREATE_NO_WINDOW | CREATE_NEW_PROCESS_GROUP);
    }
}

/// Ask the process to exit on its own (SIGTERM / CTRL_BREAK).
///
/// On Windows the child has no console (`CREATE_NO_WINDOW`), so CTRL_BREAK is
/// often not delivered and the caller's grace timeout ends in [`kill_tree`].
pub(crate) fn request_graceful_close(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        info!("Sending SIGTERM to pid {pid}");
        kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(io::Error::from)
    }

    #[cfg(windows)]
    {
        use windows_sys::Win32::System::Console::{CTRL_BREAK_EVENT, GenerateConsoleCtrlEvent};

        info!("Sending CTRL_BREAK to pid {pid}");
        // The child was started with CREATE_NEW_PROCESS_GROUP, so its pid is its group id.
        let sent = unsafe { GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid) };
        if sent == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Kill the process and everything it spawned. An already-gone group is not an error.
pub(crate) fn kill_tree(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        info!("Killing process group {pid}");
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;

        info!("Killing process tree rooted at pid {pid}");
        let output = std::process::Command::new("taskkill")
            .args(["/F", "/T", "/PID", &pid.to_string()])
            .creation_flags(CREATE_NO_WINDOW)
            .output()?;

        // 128: no such process
        if output.status.success() || output.status.code() == Some(128) {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "taskkill exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
