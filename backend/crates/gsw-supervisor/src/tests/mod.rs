#[cfg(unix)]
mod process_supervisor;

use crate::{ManagedProcess, SupervisorError, SupervisorResult, Updater};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gsw_config::{GameServerConfig, HealthCheckConfig};
use tokio_util::sync::CancellationToken;

/// Scripted behaviour and call log shared by the mock updater and process.
#[derive(Debug)]
pub(crate) struct MockState {
    pub(crate) calls: Vec<&'static str>,
    pub(crate) running: bool,
    pub(crate) errors: Vec<String>,
    pub(crate) start_succeeds: bool,
    pub(crate) elevation_on_start: bool,
    pub(crate) update_succeeds: bool,
    pub(crate) updater_missing: bool,
    pub(crate) last_stop_cancelled: Option<bool>,
}

pub(crate) type SharedState = Arc<Mutex<MockState>>;

pub(crate) fn shared_state() -> SharedState {
    Arc::new(Mutex::new(MockState {
        calls: Vec::new(),
        running: false,
        errors: Vec::new(),
        start_succeeds: true,
        elevation_on_start: false,
        update_succeeds: true,
        updater_missing: false,
        last_stop_cancelled: None,
    }))
}

pub(crate) fn calls(state: &SharedState) -> Vec<&'static str> {
    state.lock().unwrap().calls.clone()
}

pub(crate) fn reset_calls(state: &SharedState) {
    state.lock().unwrap().calls.clear();
}

pub(crate) struct MockUpdater(pub(crate) SharedState);

#[async_trait]
impl Updater for MockUpdater {
    fn validate(&self) -> SupervisorResult<()> {
        if self.0.lock().unwrap().updater_missing {
            Err(SupervisorError::updater_not_found("/missing/steamcmd"))
        } else {
            Ok(())
        }
    }

    async fn update_or_install(
        &self,
        _app_id: u32,
        _install_dir: &Path,
        _cancel: &CancellationToken,
    ) -> SupervisorResult<bool> {
        let mut state = self.0.lock().unwrap();
        state.calls.push("update");
        Ok(state.update_succeeds)
    }
}

pub(crate) struct MockProcess(pub(crate) SharedState);

#[async_trait]
impl ManagedProcess for MockProcess {
    async fn start(
        &mut self,
        _game: &GameServerConfig,
        _health: &HealthCheckConfig,
        _cancel: &CancellationToken,
    ) -> SupervisorResult<bool> {
        let mut state = self.0.lock().unwrap();
        state.calls.push("start");
        if state.elevation_on_start {
            return Err(SupervisorError::elevation_required(
                "/srv/valheim/valheim_server.x86_64",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        state.running = state.start_succeeds;
        Ok(state.start_succeeds)
    }

    async fn stop(&mut self, cancel: &CancellationToken) {
        let mut state = self.0.lock().unwrap();
        state.calls.push("stop");
        state.last_stop_cancelled = Some(cancel.is_cancelled());
        state.running = false;
    }

    fn is_running(&mut self) -> bool {
        self.0.lock().unwrap().running
    }

    fn recent_errors(&self) -> Vec<String> {
        self.0.lock().unwrap().errors.clone()
    }

    fn clear_errors(&self) {
        let mut state = self.0.lock().unwrap();
        state.calls.push("clear");
        state.errors.clear();
    }
}

pub(crate) fn game_config(update_interval_minutes: u64) -> GameServerConfig {
    GameServerConfig {
        app_id: 896660,
        install_dir: "/srv/valheim".into(),
        executable_path: "valheim_server.x86_64".into(),
        update_interval_minutes,
        ..Default::default()
    }
}

pub(crate) fn health_config(max_consecutive_failures: u32) -> HealthCheckConfig {
    HealthCheckConfig {
        max_consecutive_failures,
        check_interval_seconds: 30,
        ..Default::default()
    }
}

/// A pid counts as gone once it has exited, even if nobody has reaped it yet.
#[cfg(unix)]
pub(crate) fn process_gone(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
        Err(_) => true,
    }
}

/// Poll `condition` until it holds or a few seconds pass.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..250 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
