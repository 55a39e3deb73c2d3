// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MachineMonitor` (spec §4.6, §5): bridges the async `Monitor` RPC
//! stream to `RemoteMachine::run_until_finished`'s blocking wait.
//! Grounded on `lib/chord_sandbox/src/remote_machine.cpp`'s "read
//! current state, check terminal, else block for a state change"
//! shape, and on spec §5's own naming (`MachineMonitor::m_lock`) —
//! ported to `std::sync::{Mutex, Condvar}` rather than a libuv
//! condition loop, since this is the one blocking facade in the
//! system meant to be called from the embedding program's own thread,
//! not from inside the tokio runtime.

use std::sync::{Arc, Condvar, Mutex};
use tonic::Streaming;
use zuri_core::Status;
use zuri_wire::{MachineState, MonitorEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineExit {
    pub status_code: i32,
}

struct MonitorState {
    current: Option<MachineState>,
    exit: Option<MachineExit>,
    stream_ended: bool,
}

fn is_terminal(state: MachineState) -> bool {
    matches!(state, MachineState::Completed | MachineState::Cancelled | MachineState::Failure)
}

/// Drives a `Monitor` stream in the background; exposes a blocking
/// wait for its terminal state (`MachineMonitor::m_lock` in spec §5).
pub struct MachineMonitor {
    state: Mutex<MonitorState>,
    condvar: Condvar,
}

impl MachineMonitor {
    /// Spawns a background task draining `stream`, recording the
    /// latest state and waking every blocked waiter on each event.
    pub fn spawn(mut stream: Streaming<MonitorEvent>) -> Arc<Self> {
        let monitor = Arc::new(Self {
            state: Mutex::new(MonitorState { current: None, exit: None, stream_ended: false }),
            condvar: Condvar::new(),
        });

        let task_monitor = Arc::clone(&monitor);
        tokio::spawn(async move {
            loop {
                match stream.message().await {
                    Ok(Some(event)) => task_monitor.record(event),
                    Ok(None) | Err(_) => {
                        task_monitor.mark_stream_ended();
                        break;
                    }
                }
            }
        });

        monitor
    }

    fn record(&self, event: MonitorEvent) {
        let Ok(state) = MachineState::try_from(event.state) else {
            return;
        };
        let mut guard = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        guard.current = Some(state);
        if is_terminal(state) {
            guard.exit = Some(MachineExit { status_code: event.status_code });
        }
        self.condvar.notify_all();
    }

    fn mark_stream_ended(&self) {
        let mut guard = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        guard.stream_ended = true;
        self.condvar.notify_all();
    }

    /// Blocks the calling thread until this machine reaches a terminal
    /// state, invoking `on_state` on every distinct intermediate state
    /// observed along the way (spec §4.6's `runUntilFinished(cb?)`).
    pub fn run_until_finished(&self, mut on_state: impl FnMut(MachineState)) -> Result<MachineExit, Status> {
        let mut guard = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        let mut last_reported = None;
        loop {
            if let Some(current) = guard.current {
                if last_reported != Some(current) {
                    on_state(current);
                    last_reported = Some(current);
                }
            }
            if let Some(exit) = guard.exit {
                return Ok(exit);
            }
            if guard.stream_ended {
                return Err(Status::agent_unreachable(
                    "monitor stream ended before the machine reached a terminal state",
                ));
            }
            guard = self.condvar.wait(guard).unwrap_or_else(|poison| poison.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_terminal_covers_exactly_the_three_terminal_states() {
        assert!(is_terminal(MachineState::Completed));
        assert!(is_terminal(MachineState::Cancelled));
        assert!(is_terminal(MachineState::Failure));
        assert!(!is_terminal(MachineState::Starting));
        assert!(!is_terminal(MachineState::Running));
        assert!(!is_terminal(MachineState::Suspended));
    }
}
