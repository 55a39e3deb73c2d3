// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Machine` record (spec §3): one running instance of a bytecode
//! program, identified by a [`MachineUrl`], progressing monotonically
//! through [`MachineState`].

use crate::invoker::Invoker;
use crate::url::MachineUrl;
use std::path::PathBuf;

/// Logical lifecycle state of a machine, as observed by the agent.
///
/// Invariant: progresses monotonically `Initial -> Created ->
/// (Terminating) -> Exited`; never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineState {
    Initial,
    Created,
    Terminating,
    Exited,
}

impl MachineState {
    /// True if `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: MachineState) -> bool {
        use MachineState::*;
        matches!(
            (self, next),
            (Initial, Created)
                | (Created, Terminating)
                | (Created, Exited)
                | (Terminating, Exited)
        )
    }
}

/// Exit information for a machine. Only meaningful once the machine has
/// reached [`MachineState::Exited`]; written exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    pub status: i64,
    pub signal: i32,
}

#[derive(Debug, Clone)]
pub struct Machine {
    url: MachineUrl,
    invoker: Invoker,
    cwd: PathBuf,
    state: MachineState,
    exit: Option<ExitInfo>,
}

impl Machine {
    pub fn new(url: MachineUrl, invoker: Invoker, cwd: PathBuf) -> Self {
        Self { url, invoker, cwd, state: MachineState::Initial, exit: None }
    }

    pub fn url(&self) -> &MachineUrl {
        &self.url
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn exit(&self) -> Option<ExitInfo> {
        self.exit
    }

    /// Move the machine to `Created`. Fails (returns `false`, state
    /// unchanged) if the machine isn't `Initial`.
    #[must_use]
    pub fn mark_created(&mut self) -> bool {
        self.transition(MachineState::Created)
    }

    /// Move the machine to `Terminating`. Fails if not currently `Created`.
    #[must_use]
    pub fn mark_terminating(&mut self) -> bool {
        self.transition(MachineState::Terminating)
    }

    /// Move the machine to `Exited`, recording its exit status and
    /// signal exactly once. Fails if already `Exited`.
    #[must_use]
    pub fn mark_exited(&mut self, status: i64, signal: i32) -> bool {
        if self.state == MachineState::Exited {
            return false;
        }
        let transitioned = self.transition(MachineState::Exited);
        if transitioned {
            self.exit = Some(ExitInfo { status, signal });
        }
        transitioned
    }

    fn transition(&mut self, next: MachineState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
