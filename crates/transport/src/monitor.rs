// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Monitor`'s event feed (spec §4.3, §8): translates the runner's
//! `Reply` sequence into the wire's `MonitorEvent` sequence, recording
//! history so any number of `Monitor` calls (even ones that arrive
//! after some transitions already happened) observe the full prefix
//! up to the current point, and closes after the first terminal event.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use zuri_core::{Reply, Status as CoreStatus};
use zuri_wire::{MachineState, MonitorEvent};

/// One recorded transition, in the wire's own vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorEventRecord {
    pub state: MachineState,
    pub status_code: i32,
}

impl MonitorEventRecord {
    fn starting() -> Self {
        Self { state: MachineState::Starting, status_code: 0 }
    }

    fn from_reply(reply: &Reply) -> Self {
        match reply {
            Reply::Running => Self { state: MachineState::Running, status_code: 0 },
            Reply::Suspended => Self { state: MachineState::Suspended, status_code: 0 },
            Reply::Completed => Self { state: MachineState::Completed, status_code: 0 },
            Reply::Cancelled => Self { state: MachineState::Cancelled, status_code: 0 },
            Reply::Failure(status) => {
                Self { state: MachineState::Failure, status_code: status_code_of(status) }
            }
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.state, MachineState::Completed | MachineState::Cancelled | MachineState::Failure)
    }

    pub fn into_wire(self) -> MonitorEvent {
        MonitorEvent { state: self.state as i32, status_code: self.status_code }
    }
}

fn status_code_of(status: &CoreStatus) -> i32 {
    status.code as i32
}

struct State {
    events: VecDeque<MonitorEventRecord>,
    closed: bool,
}

struct Inner {
    state: Mutex<State>,
    progress_tx: watch::Sender<usize>,
    progress_rx: watch::Receiver<usize>,
}

/// Shared handle to one machine's lifecycle feed. Clone freely —
/// every clone observes the same history and the same closing event.
#[derive(Clone)]
pub struct MonitorFeed(Arc<Inner>);

impl MonitorFeed {
    /// Starts the feed, immediately recording `Starting` (spec §8:
    /// "the sequence of emitted MonitorEvent values equals the prefix
    /// of runner state transitions up to and including the first
    /// terminal state" — `Starting` is the transition into existence).
    pub fn new() -> Self {
        let (progress_tx, progress_rx) = watch::channel(0);
        let feed = Self(Arc::new(Inner {
            state: Mutex::new(State { events: VecDeque::new(), closed: false }),
            progress_tx,
            progress_rx,
        }));
        feed.push(MonitorEventRecord::starting());
        feed
    }

    pub fn record_reply(&self, reply: &Reply) {
        self.push(MonitorEventRecord::from_reply(reply));
    }

    fn push(&self, event: MonitorEventRecord) {
        let mut state = self.0.state.lock();
        if state.closed {
            return;
        }
        let terminal = event.is_terminal();
        state.events.push_back(event);
        let len = state.events.len();
        if terminal {
            state.closed = true;
        }
        drop(state);
        let _ = self.0.progress_tx.send(len);
    }

    /// Blocks until the event at `index` is available, or returns
    /// `None` once the feed is closed with no event at that index —
    /// i.e. the stream has already emitted its terminal event.
    pub async fn next_after(&self, index: usize) -> Option<MonitorEventRecord> {
        let mut rx = self.0.progress_rx.clone();
        loop {
            {
                let state = self.0.state.lock();
                if let Some(event) = state.events.get(index) {
                    return Some(event.clone());
                }
                if state.closed {
                    return None;
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

impl Default for MonitorFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
