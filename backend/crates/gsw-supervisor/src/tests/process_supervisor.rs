use crate::tests::{eventually, process_gone};
use crate::{
    GenericProfile, ManagedProcess, ProcessSupervisor, SupervisorError, SupervisorState,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use gsw_config::{GameServerConfig, HealthCheckConfig};
use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Runs `script` under `/bin/sh -c`, which avoids exec-ing freshly written files.
fn shell_game(script: &str, extra_args: &str) -> GameServerConfig {
    GameServerConfig {
        app_id: 896660,
        install_dir: "/tmp".into(),
        executable_path: "/bin/sh".into(),
        launch_arguments: format!("-c '{script}' sh {extra_args}"),
        ..Default::default()
    }
}

fn health(patterns: &[&str]) -> HealthCheckConfig {
    HealthCheckConfig {
        error_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    }
}

fn supervisor() -> ProcessSupervisor {
    ProcessSupervisor::new(Arc::new(GenericProfile), 50)
}

#[tokio::test]
#[serial]
async fn given_missing_executable_when_start_then_returns_false() {
    // Given
    let temp = TempDir::new().unwrap();
    let game = GameServerConfig {
        app_id: 896660,
        install_dir: temp.path().to_path_buf(),
        executable_path: "valheim_server.x86_64".into(),
        ..Default::default()
    };
    let mut supervisor = supervisor();

    // When
    let result = supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await;

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(result.unwrap(), eq(false));
    assert_that!(supervisor.is_running(), eq(false));
    assert_that!(supervisor.state(), eq(SupervisorState::Idle));
}

#[tokio::test]
#[serial]
async fn given_stdout_error_when_running_then_only_matching_lines_recorded() {
    // Given
    let game = shell_game(
        r#"echo "Server ERROR: world corrupt"; echo "all good"; exec sleep 30"#,
        "",
    );
    let mut supervisor = supervisor();
    let cancel = CancellationToken::new();

    // When
    let started = supervisor
        .start(&game, &health(&["error"]), &cancel)
        .await
        .unwrap();
    let recorded = eventually(|| !supervisor.recent_errors().is_empty()).await;

    // Then
    assert_that!(started, eq(true));
    assert_that!(recorded, eq(true));
    assert_that!(supervisor.is_running(), eq(true));
    assert_eq!(
        supervisor.recent_errors(),
        vec!["Server ERROR: world corrupt"]
    );

    supervisor.stop(&cancel).await;
}

#[tokio::test]
#[serial]
async fn given_stderr_line_when_no_pattern_matches_then_still_recorded() {
    // Given
    let game = shell_game(r#"echo "fatal crash detected" >&2; exec sleep 30"#, "");
    let mut supervisor = supervisor();
    let cancel = CancellationToken::new();

    // When
    supervisor
        .start(&game, &health(&["zzz"]), &cancel)
        .await
        .unwrap();
    let recorded = eventually(|| supervisor.recent_errors().len() == 1).await;

    // Then
    assert_that!(recorded, eq(true));
    assert_eq!(supervisor.recent_errors(), vec!["fatal crash detected"]);

    supervisor.stop(&cancel).await;
}

#[tokio::test]
#[serial]
async fn given_quoted_launch_arguments_when_start_then_passed_as_words() {
    // Given
    let game = shell_game(r#"echo "$1|$2"; exec sleep 30"#, r#""arg one" two"#);
    let mut supervisor = supervisor();
    let cancel = CancellationToken::new();

    // When
    supervisor
        .start(&game, &health(&["arg"]), &cancel)
        .await
        .unwrap();
    let recorded = eventually(|| !supervisor.recent_errors().is_empty()).await;

    // Then
    assert_that!(recorded, eq(true));
    assert_eq!(supervisor.recent_errors(), vec!["arg one|two"]);

    supervisor.stop(&cancel).await;
}

#[tokio::test]
#[serial]
async fn given_running_process_when_stop_then_exits_gracefully() {
    // Given
    let game = shell_game("exec sleep 30", "");
    let mut supervisor = supervisor();
    let cancel = CancellationToken::new();
    supervisor
        .start(&game, &health(&["error"]), &cancel)
        .await
        .unwrap();
    assert!(supervisor.pid().is_some());

    // When
    let started_at = Instant::now();
    supervisor.stop(&cancel).await;

    // Then
    assert!(started_at.elapsed() < Duration::from_secs(10));
    assert_that!(supervisor.is_running(), eq(false));
    assert_that!(supervisor.state(), eq(SupervisorState::Idle));
}

#[tokio::test]
#[serial]
async fn given_process_ignoring_sigterm_when_stop_cancelled_then_force_killed() {
    // Given
    let game = shell_game("trap \"\" TERM; while true; do sleep 1; done", "");
    let mut supervisor = supervisor();
    supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await
        .unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    // When
    let started_at = Instant::now();
    supervisor.stop(&cancel).await;

    // Then
    assert!(started_at.elapsed() < Duration::from_secs(10));
    assert_that!(supervisor.is_running(), eq(false));
}

#[tokio::test]
#[serial]
async fn given_process_ignoring_sigterm_when_grace_period_expires_then_force_killed() {
    // Given
    let game = shell_game("trap \"\" TERM; while true; do sleep 1; done", "");
    let mut supervisor = supervisor().with_grace_period(Duration::from_millis(300));
    let cancel = CancellationToken::new();
    supervisor
        .start(&game, &health(&["error"]), &cancel)
        .await
        .unwrap();

    // When
    let started_at = Instant::now();
    supervisor.stop(&cancel).await;

    // Then
    assert!(started_at.elapsed() < Duration::from_secs(10));
    assert_that!(supervisor.is_running(), eq(false));
}

#[tokio::test]
#[serial]
async fn given_process_exits_on_its_own_when_polled_then_not_running() {
    // Given
    let game = shell_game("exit 3", "");
    let mut supervisor = supervisor();
    supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await
        .unwrap();

    // When
    let exited = eventually(|| !supervisor.is_running()).await;

    // Then
    assert_that!(exited, eq(true));
    assert_that!(supervisor.state(), eq(SupervisorState::Idle));
}

#[tokio::test]
#[serial]
async fn given_nothing_tracked_when_stop_then_no_op() {
    let mut supervisor = supervisor();

    supervisor.stop(&CancellationToken::new()).await;

    assert_that!(supervisor.is_running(), eq(false));
    assert_that!(supervisor.state(), eq(SupervisorState::Idle));
}

#[tokio::test]
#[serial]
async fn given_running_process_when_started_again_then_old_errors_cleared() {
    // Given
    let noisy = shell_game(r#"echo "ERROR first run"; exec sleep 30"#, "");
    let quiet = shell_game("exec sleep 30", "");
    let mut supervisor = supervisor();
    let cancel = CancellationToken::new();
    supervisor
        .start(&noisy, &health(&["error"]), &cancel)
        .await
        .unwrap();
    assert!(eventually(|| !supervisor.recent_errors().is_empty()).await);
    let first_pid = supervisor.pid();

    // When
    let restarted = supervisor
        .start(&quiet, &health(&["error"]), &cancel)
        .await
        .unwrap();

    // Then
    assert_that!(restarted, eq(true));
    assert!(supervisor.recent_errors().is_empty());
    assert_ne!(supervisor.pid(), first_pid);

    supervisor.stop(&cancel).await;
}

#[tokio::test]
#[serial]
async fn given_running_process_when_restarted_then_previous_process_is_gone() {
    // Given
    let game = shell_game("trap \"\" TERM; while true; do sleep 1; done", "");
    let mut supervisor = supervisor().with_grace_period(Duration::from_millis(300));
    let cancel = CancellationToken::new();
    supervisor
        .start(&game, &health(&["error"]), &cancel)
        .await
        .unwrap();
    let first_pid = supervisor.pid().unwrap();

    // When
    supervisor
        .start(&game, &health(&["error"]), &cancel)
        .await
        .unwrap();

    // Then
    assert!(eventually(|| process_gone(first_pid)).await);
    assert_ne!(supervisor.pid(), Some(first_pid));
    assert_that!(supervisor.is_running(), eq(true));

    supervisor.stop(&cancel).await;
}

#[tokio::test]
#[serial]
async fn given_running_process_when_supervisor_dropped_then_process_is_gone() {
    // Given
    let game = shell_game("exec sleep 30", "");
    let mut supervisor = supervisor();
    supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await
        .unwrap();
    let pid = supervisor.pid().unwrap();

    // When
    drop(supervisor);

    // Then
    assert!(eventually(|| process_gone(pid)).await);
}

#[tokio::test]
#[serial]
async fn given_running_process_when_disposed_twice_then_killed_once_without_panic() {
    // Given
    let game = shell_game("exec sleep 30", "");
    let mut supervisor = supervisor();
    supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await
        .unwrap();

    // When
    supervisor.dispose();
    supervisor.dispose();

    // Then
    assert_that!(supervisor.is_running(), eq(false));
    assert_eq!(supervisor.pid(), None);
}

#[tokio::test]
#[serial]
async fn given_non_executable_file_when_start_then_elevation_required() {
    // Given
    let temp = TempDir::new().unwrap();
    let binary = temp.path().join("valheim_server.x86_64");
    std::fs::write(&binary, "not a program").unwrap();
    let game = GameServerConfig {
        app_id: 896660,
        install_dir: temp.path().to_path_buf(),
        executable_path: "valheim_server.x86_64".into(),
        ..Default::default()
    };
    let mut supervisor = supervisor();

    // When
    let result = supervisor
        .start(&game, &health(&["error"]), &CancellationToken::new())
        .await;

    // Then
    assert_that!(result, err(anything()));
    let error = result.unwrap_err();
    assert!(matches!(error, SupervisorError::ElevationRequired { .. }));
    assert_that!(supervisor.state(), eq(SupervisorState::Idle));
}
