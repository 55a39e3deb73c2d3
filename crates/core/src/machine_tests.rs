// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::invoker::Invoker;

fn machine() -> Machine {
    let url = MachineUrl::parse("dev.zuri.machine:test").unwrap();
    Machine::new(url, Invoker::new("/bin/true", vec![]), PathBuf::from("/tmp"))
}

#[test]
fn monotonic_happy_path() {
    let mut m = machine();
    assert_eq!(m.state(), MachineState::Initial);
    assert!(m.mark_created());
    assert_eq!(m.state(), MachineState::Created);
    assert!(m.mark_terminating());
    assert_eq!(m.state(), MachineState::Terminating);
    assert!(m.mark_exited(0, 0));
    assert_eq!(m.state(), MachineState::Exited);
}

#[test]
fn created_can_exit_directly_without_terminating() {
    let mut m = machine();
    assert!(m.mark_created());
    assert!(m.mark_exited(1, 0));
    assert_eq!(m.state(), MachineState::Exited);
}

#[test]
fn exit_fields_written_exactly_once() {
    let mut m = machine();
    assert!(m.mark_created());
    assert!(m.mark_exited(7, 0));
    assert_eq!(m.exit(), Some(ExitInfo { status: 7, signal: 0 }));
    // A second exit attempt is rejected and does not overwrite exit info.
    assert!(!m.mark_exited(99, 9));
    assert_eq!(m.exit(), Some(ExitInfo { status: 7, signal: 0 }));
}

#[test]
fn never_regresses() {
    let mut m = machine();
    assert!(m.mark_created());
    assert!(m.mark_exited(0, 0));
    assert!(!m.mark_created());
    assert_eq!(m.state(), MachineState::Exited);
}

#[test]
fn cannot_skip_initial() {
    let mut m = machine();
    assert!(!m.mark_terminating());
    assert_eq!(m.state(), MachineState::Initial);
}
