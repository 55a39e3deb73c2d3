// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn sh(script: &str) -> Invoker {
    Invoker::new("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

fn url(name: &str) -> MachineUrl {
    MachineUrl::parse(format!("dev.zuri.machine:{name}")).unwrap()
}

#[tokio::test]
async fn spawn_requires_initialize_first() {
    let supervisor = MachineSupervisor::new();
    let err = supervisor.spawn(url("a"), sh("exit 0"), std::env::temp_dir()).await.unwrap_err();
    assert_eq!(err, SupervisorError::NotInitialized);
}

#[tokio::test]
async fn initialize_twice_fails() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    assert_eq!(supervisor.initialize().unwrap_err(), SupervisorError::AlreadyInitialized);
}

#[tokio::test]
async fn spawn_rejects_a_duplicate_url() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let u = url("dup");
    supervisor.spawn(u.clone(), sh("sleep 5"), std::env::temp_dir()).await.unwrap();
    let err = supervisor.spawn(u, sh("sleep 5"), std::env::temp_dir()).await.unwrap_err();
    assert_eq!(err, SupervisorError::AlreadyExists);
    supervisor.shutdown().await;
}

#[tokio::test]
async fn spawn_transitions_to_created_with_stdin_closed() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let process = supervisor.spawn(url("created"), sh("sleep 30"), std::env::temp_dir()).await.unwrap();
    assert_eq!(process.state(), MachineState::Created);
    supervisor.shutdown().await;
}

#[tokio::test]
async fn release_is_observed_through_exit_status_and_subscription() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let mut events = supervisor.subscribe();

    let u = url("exit-code");
    let process = supervisor.spawn(u.clone(), sh("exit 7"), std::env::temp_dir()).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
    assert_eq!(event.url, u);
    assert_eq!(event.status, 7);
    assert_eq!(event.signal, 0);
    assert_eq!(process.state(), MachineState::Exited);
    assert_eq!(process.exit(), Some(zuri_core::ExitInfo { status: 7, signal: 0 }));
}

#[tokio::test]
async fn terminate_rejects_an_unknown_url() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let err = supervisor.terminate(&url("ghost"), Signal::SIGTERM).unwrap_err();
    assert_eq!(err, SupervisorError::NotFound);
}

#[tokio::test]
async fn terminate_after_exit_fails_with_invalid_state() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let mut events = supervisor.subscribe();
    let u = url("already-gone");
    supervisor.spawn(u.clone(), sh("exit 0"), std::env::temp_dir()).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();

    let err = supervisor.terminate(&u, Signal::SIGTERM).unwrap_err();
    assert_eq!(err, SupervisorError::InvalidState);
}

#[tokio::test]
async fn terminate_sends_sigterm_and_the_reaper_records_the_signal() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    let mut events = supervisor.subscribe();
    let u = url("sigterm");
    supervisor.spawn(u.clone(), sh("sleep 30"), std::env::temp_dir()).await.unwrap();

    supervisor.terminate(&u, Signal::SIGTERM).unwrap();
    let event = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap().unwrap();
    assert_eq!(event.signal, Signal::SIGTERM as i32);
}

#[tokio::test]
async fn shutdown_reaps_every_child_within_the_grace_period() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    supervisor.spawn(url("s1"), sh("sleep 30"), std::env::temp_dir()).await.unwrap();
    supervisor.spawn(url("s2"), sh("sleep 30"), std::env::temp_dir()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(10), supervisor.shutdown()).await.unwrap();

    assert_eq!(supervisor.spawn(url("s3"), sh("sleep 1"), std::env::temp_dir()).await.unwrap_err(), SupervisorError::ShuttingDown);
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let supervisor = MachineSupervisor::new();
    supervisor.initialize().unwrap();
    supervisor.spawn(url("idem"), sh("sleep 30"), std::env::temp_dir()).await.unwrap();
    supervisor.shutdown().await;
    supervisor.shutdown().await;
}
