// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One supervised child process record (spec §4.1).

use crate::logger::MachineLogger;
use parking_lot::Mutex;
use zuri_core::{ExitInfo, Machine, MachineState, MachineUrl};

/// A single spawned worker process, tracked from `Created` through
/// `Exited`. Holds the process's [`MachineLogger`] so the logger lives
/// exactly as long as the record does.
pub struct MachineProcess {
    machine: Mutex<Machine>,
    pid: u32,
    #[allow(dead_code)]
    logger: MachineLogger,
}

impl MachineProcess {
    pub(crate) fn new(machine: Machine, pid: u32, logger: MachineLogger) -> Self {
        Self { machine: Mutex::new(machine), pid, logger }
    }

    pub fn url(&self) -> MachineUrl {
        self.machine.lock().url().clone()
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn state(&self) -> MachineState {
        self.machine.lock().state()
    }

    pub fn exit(&self) -> Option<ExitInfo> {
        self.machine.lock().exit()
    }

    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, Machine> {
        self.machine.lock()
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
