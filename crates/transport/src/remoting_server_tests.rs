// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit-level coverage of the unary RPCs and the `Monitor` feed. The
//! full `Communicate` duplex path (spec §8 scenario 5) is exercised
//! end to end over a real loopback server in `tests/communicate.rs`,
//! since `tonic::Streaming` can't be constructed by hand.

use super::*;
use futures::StreamExt;
use std::time::Duration;
use zuri_runner::{ExecutionOutcome, Interpreter, Interrupts};

struct SpinUntilInterrupted;

impl Interpreter for SpinUntilInterrupted {
    fn run(&mut self, interrupts: &dyn Interrupts) -> ExecutionOutcome {
        loop {
            match interrupts.poll() {
                Some(zuri_core::Command::Suspend) => return ExecutionOutcome::Interrupted,
                Some(zuri_core::Command::Terminate) => return ExecutionOutcome::Terminated,
                _ => std::thread::sleep(Duration::from_millis(5)),
            }
        }
    }
}

fn service() -> RemotingServiceImpl {
    let runner = Arc::new(RunnerThread::spawn(Box::new(SpinUntilInterrupted)));
    let ports = Arc::new(PortRegistry::new(Vec::new()));
    RemotingServiceImpl::new(runner, ports, Arc::new(InitBarrier::always_satisfied()))
}

#[tokio::test]
async fn suspend_resume_terminate_enqueue_without_waiting_for_effect() {
    let service = service();

    let reply = service.suspend(Request::new(Empty {})).await.unwrap();
    assert_eq!(reply.into_inner().status_code, 0);

    let reply = service.resume(Request::new(Empty {})).await.unwrap();
    assert_eq!(reply.into_inner().status_code, 0);

    let reply = service.terminate(Request::new(Empty {})).await.unwrap();
    assert_eq!(reply.into_inner().status_code, 0);
}

#[tokio::test]
async fn constructing_without_start_suspended_issues_initial_resume() {
    let runner = Arc::new(RunnerThread::spawn(Box::new(SpinUntilInterrupted)));
    let ports = Arc::new(PortRegistry::new(Vec::new()));
    let _service = RemotingServiceImpl::new(runner.clone(), ports, Arc::new(InitBarrier::always_satisfied()));

    let reply = runner.replies().wait_for_message_timeout(Duration::from_secs(5));
    assert_eq!(reply, Some(zuri_core::Reply::Running));
}

#[tokio::test]
async fn start_suspended_withholds_resume_until_barrier_clears() {
    let runner = Arc::new(RunnerThread::spawn(Box::new(SpinUntilInterrupted)));
    let ports = Arc::new(PortRegistry::new(Vec::new()));
    let barrier = Arc::new(InitBarrier::new(["dev.zuri.proto:a".to_string()]));
    let _service = RemotingServiceImpl::new(runner.clone(), ports, Arc::clone(&barrier));

    assert_eq!(runner.replies().wait_for_message_timeout(Duration::from_millis(100)), None);

    barrier.mark_attached("dev.zuri.proto:a");
    runner.commands().send(zuri_core::Command::Resume);
    assert_eq!(runner.replies().wait_for_message_timeout(Duration::from_secs(5)), Some(zuri_core::Reply::Running));
}

#[tokio::test]
async fn monitor_stream_reports_the_transition_prefix_and_then_closes() {
    let service = service();
    let response = service.monitor(Request::new(Empty {})).await.unwrap();
    let mut stream = response.into_inner();

    let first: MonitorEvent = stream.next().await.unwrap().unwrap();
    assert_eq!(first.state, zuri_wire::MachineState::Starting as i32);

    service.runner.commands().send(zuri_core::Command::Resume);
    let second: MonitorEvent = stream.next().await.unwrap().unwrap();
    assert_eq!(second.state, zuri_wire::MachineState::Running as i32);

    service.runner.commands().send(zuri_core::Command::Terminate);
    let third: MonitorEvent = stream.next().await.unwrap().unwrap();
    assert_eq!(third.state, zuri_wire::MachineState::Cancelled as i32);

    assert!(stream.next().await.is_none());
}
