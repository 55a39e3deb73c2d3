// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MachineSupervisor` (spec §4.1): owns the set of spawned worker
//! processes, spawns them on demand, reaps their exits, and fans
//! `MachineExited` events out to any number of subscribers.

use crate::logger::MachineLogger;
use crate::process::MachineProcess;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use zuri_core::{Invoker, Machine, MachineState, MachineUrl};

/// The grace period between SIGTERM and SIGKILL during `shutdown()`
/// (spec §5's "shutdown grace of ~5 seconds").
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("initialize() called twice")]
    AlreadyInitialized,
    #[error("spawn() called before initialize()")]
    NotInitialized,
    #[error("a machine already exists for this url")]
    AlreadyExists,
    #[error("no machine exists for this url")]
    NotFound,
    #[error("the supervisor is shutting down")]
    ShuttingDown,
    #[error("the machine is not in a state that accepts this operation")]
    InvalidState,
    #[error("failed to spawn child process: {0}")]
    SpawnFailed(String),
    #[error("failed to signal child process: {0}")]
    SignalFailed(String),
}

/// Fanned out from `release()` whenever a supervised process exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineExited {
    pub url: MachineUrl,
    pub status: i64,
    pub signal: i32,
}

struct Inner {
    processes: Mutex<HashMap<MachineUrl, Arc<MachineProcess>>>,
    initialized: Mutex<bool>,
    shutting_down: AtomicBool,
    events: broadcast::Sender<MachineExited>,
    reapers: Mutex<JoinSet<()>>,
}

impl Inner {
    fn release(&self, url: &MachineUrl, status: i64, signal: i32) {
        let processes = self.processes.lock();
        if let Some(process) = processes.get(url) {
            let _ = process.lock().mark_exited(status, signal);
        }
        drop(processes);
        let _ = self.events.send(MachineExited { url: url.clone(), status, signal });
    }
}

/// Maintains the mapping from machine URL to [`MachineProcess`]; the
/// only thing in the agent that forks and signals worker processes.
#[derive(Clone)]
pub struct MachineSupervisor {
    inner: Arc<Inner>,
}

impl MachineSupervisor {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                processes: Mutex::new(HashMap::new()),
                initialized: Mutex::new(false),
                shutting_down: AtomicBool::new(false),
                events,
                reapers: Mutex::new(JoinSet::new()),
            }),
        }
    }

    /// Binds the supervisor to the calling task's runtime. Fails if
    /// called twice.
    pub fn initialize(&self) -> Result<(), SupervisorError> {
        let mut initialized = self.inner.initialized.lock();
        if *initialized {
            return Err(SupervisorError::AlreadyInitialized);
        }
        *initialized = true;
        Ok(())
    }

    /// Subscribes to `MachineExited` events. Events sent before a
    /// subscriber calls this are not replayed, matching
    /// `tokio::sync::broadcast`'s own catch-up semantics.
    pub fn subscribe(&self) -> broadcast::Receiver<MachineExited> {
        self.inner.events.subscribe()
    }

    /// Forks `invoker` under `cwd`, wires its stdout/stderr into a
    /// [`MachineLogger`], and transitions the new record to `Created`.
    /// The child's stdin is closed.
    pub async fn spawn(
        &self,
        url: MachineUrl,
        invoker: Invoker,
        cwd: PathBuf,
    ) -> Result<Arc<MachineProcess>, SupervisorError> {
        if !*self.inner.initialized.lock() {
            return Err(SupervisorError::NotInitialized);
        }
        if self.inner.shutting_down.load(Ordering::SeqCst) {
            return Err(SupervisorError::ShuttingDown);
        }
        {
            let processes = self.inner.processes.lock();
            if processes.contains_key(&url) {
                return Err(SupervisorError::AlreadyExists);
            }
        }

        let mut command = Command::new(invoker.executable());
        command
            .args(invoker.argv())
            .current_dir(&cwd)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let mut child = command.spawn().map_err(|error| SupervisorError::SpawnFailed(error.to_string()))?;
        let pid = child
            .id()
            .ok_or_else(|| SupervisorError::SpawnFailed("child exited before its pid could be read".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SupervisorError::SpawnFailed("child stdout was not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SupervisorError::SpawnFailed("child stderr was not piped".to_string()))?;
        let logger = MachineLogger::spawn(url.clone(), stdout, stderr);

        let mut machine = Machine::new(url.clone(), invoker, cwd);
        if !machine.mark_created() {
            return Err(SupervisorError::InvalidState);
        }
        let process = Arc::new(MachineProcess::new(machine, pid, logger));

        self.inner.processes.lock().insert(url.clone(), Arc::clone(&process));

        let inner = Arc::clone(&self.inner);
        self.inner.reapers.lock().spawn(async move {
            let (status, signal) = match child.wait().await {
                Ok(exit_status) => (exit_status.code().unwrap_or(-1) as i64, exit_status.signal().unwrap_or(0)),
                Err(error) => {
                    tracing::error!(machine = %url, %error, "failed to wait on child process");
                    (-1, 0)
                }
            };
            inner.release(&url, status, signal);
        });

        Ok(process)
    }

    /// Transitions `url`'s record to `Exited` and fans a
    /// `MachineExited` event out to every current subscriber. Normally
    /// invoked only from the reaper task `spawn()` installs.
    pub fn release(&self, url: &MachineUrl, status: i64, signal: i32) {
        self.inner.release(url, status, signal);
    }

    /// Sends `signal` to `url`'s child. `Created -> Terminating`.
    /// Idempotent: a second call while already `Terminating` re-sends
    /// the signal but does not error. Fails with `InvalidState` once
    /// the machine has `Exited`.
    pub fn terminate(&self, url: &MachineUrl, signal: Signal) -> Result<(), SupervisorError> {
        let processes = self.inner.processes.lock();
        let process = processes.get(url).ok_or(SupervisorError::NotFound)?;
        let mut machine = process.lock();
        if machine.state() == MachineState::Exited {
            return Err(SupervisorError::InvalidState);
        }
        kill(Pid::from_raw(process.pid() as i32), signal)
            .map_err(|errno| SupervisorError::SignalFailed(errno.to_string()))?;
        if machine.state() == MachineState::Created {
            let _ = machine.mark_terminating();
        }
        Ok(())
    }

    /// Refuses new spawns, SIGTERMs every non-exited child, waits up to
    /// a bounded grace period, then SIGKILLs stragglers, and joins the
    /// reaper tasks before returning. No method may be called after
    /// this returns.
    pub async fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let urls: Vec<MachineUrl> = self.inner.processes.lock().keys().cloned().collect();
        for url in &urls {
            let _ = self.terminate(url, Signal::SIGTERM);
        }

        let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
        loop {
            let all_exited = self.all_exited(&urls);
            if all_exited || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }

        if !self.all_exited(&urls) {
            for url in &urls {
                let _ = self.terminate(url, Signal::SIGKILL);
            }
        }

        let mut reapers = std::mem::replace(&mut *self.inner.reapers.lock(), JoinSet::new());
        while reapers.join_next().await.is_some() {}
    }

    fn all_exited(&self, urls: &[MachineUrl]) -> bool {
        let processes = self.inner.processes.lock();
        urls.iter().all(|url| processes.get(url).map(|p| p.state() == MachineState::Exited).unwrap_or(true))
    }
}

impl Default for MachineSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
