// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runner state machine's transition table (spec §4.2), factored
//! out of [`crate::runner_thread`] so it can be exercised directly —
//! one message, one transition, with no interpreter involved.

use zuri_core::{Command, Reply, RunnerState, Status, StatusNamespace};

/// The result of feeding one `Command` to the table while the runner
/// is *not* mid-execution (`Running` is only ever observed transiently
/// by [`crate::runner_thread`], never by this function's caller).
pub struct Dispatch {
    pub next_state: RunnerState,
    pub reply: Option<Reply>,
    /// Set only on `Initial`/`Stopped` + `Resume`: the caller must now
    /// hand control to the interpreter.
    pub execute: bool,
}

fn unexpected_state(command: &str, state: &str) -> Status {
    Status::new(
        StatusNamespace::RuntimeInvariant,
        1,
        format!("unexpected interpreter state: received {command} while {state}"),
    )
}

pub fn dispatch(state: &RunnerState, command: Command) -> Dispatch {
    use Command::*;
    match (state, command) {
        (RunnerState::Initial, Resume) | (RunnerState::Stopped, Resume) => {
            Dispatch { next_state: RunnerState::Running, reply: Some(Reply::Running), execute: true }
        }
        (RunnerState::Initial, Suspend) => {
            Dispatch { next_state: RunnerState::Stopped, reply: Some(Reply::Suspended), execute: false }
        }
        (RunnerState::Stopped, Suspend) => {
            // Already suspended: acknowledge, no state change.
            Dispatch { next_state: RunnerState::Stopped, reply: Some(Reply::Suspended), execute: false }
        }
        (RunnerState::Initial, Terminate) | (RunnerState::Stopped, Terminate) => {
            Dispatch { next_state: RunnerState::Shutdown, reply: Some(Reply::Cancelled), execute: false }
        }
        (RunnerState::Shutdown, Resume) => {
            let status = unexpected_state("Resume", "Shutdown");
            Dispatch { next_state: RunnerState::Failed(status.clone()), reply: Some(Reply::Failure(status)), execute: false }
        }
        (RunnerState::Shutdown, Suspend) => {
            let status = unexpected_state("Suspend", "Shutdown");
            Dispatch { next_state: RunnerState::Failed(status.clone()), reply: Some(Reply::Failure(status)), execute: false }
        }
        (RunnerState::Shutdown, Terminate) => {
            // Confirms a shutdown already in effect.
            Dispatch { next_state: RunnerState::Shutdown, reply: Some(Reply::Completed), execute: false }
        }
        (RunnerState::Failed(status), _) => {
            Dispatch { next_state: RunnerState::Failed(status.clone()), reply: Some(Reply::Failure(status.clone())), execute: false }
        }
        (RunnerState::Running, _) => {
            unreachable!("runner_thread never dispatches a top-level command while Running")
        }
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
