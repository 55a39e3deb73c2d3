// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use zuri_core::Invoker;

fn machine() -> Machine {
    Machine::new(
        MachineUrl::parse("dev.zuri.machine:test").unwrap(),
        Invoker::new("/bin/true", Vec::new()),
        std::env::temp_dir(),
    )
}

fn logger() -> MachineLogger {
    let (out_w, out_r) = tokio::io::duplex(1);
    let (err_w, err_r) = tokio::io::duplex(1);
    drop(out_w);
    drop(err_w);
    MachineLogger::spawn(MachineUrl::parse("dev.zuri.machine:test").unwrap(), out_r, err_r)
}

#[tokio::test]
async fn exposes_url_pid_and_state() {
    let process = MachineProcess::new(machine(), 4242, logger());
    assert_eq!(process.url().as_str(), "dev.zuri.machine:test");
    assert_eq!(process.pid(), 4242);
    assert_eq!(process.state(), MachineState::Initial);
    assert!(process.exit().is_none());
}

#[tokio::test]
async fn reflects_mutations_made_through_lock() {
    let process = MachineProcess::new(machine(), 1, logger());
    assert!(process.lock().mark_created());
    assert_eq!(process.state(), MachineState::Created);
    assert!(process.lock().mark_exited(0, 0));
    assert_eq!(process.exit(), Some(zuri_core::ExitInfo { status: 0, signal: 0 }));
}
