// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads a spawned worker's stdout/stderr independently and emits one
//! `tracing` record per line (spec §4.1). Each pipe is its own task so
//! a half closing (EOF on one stream) doesn't affect the other; a
//! dropped `MachineLogger` aborts whichever half is still reading.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use zuri_core::MachineUrl;

pub struct MachineLogger {
    out_task: Option<JoinHandle<()>>,
    err_task: Option<JoinHandle<()>>,
}

impl MachineLogger {
    /// Spawns the two line-reader tasks. `stdout`/`stderr` are the
    /// piped halves of a freshly spawned child.
    pub fn spawn<O, E>(machine: MachineUrl, stdout: O, stderr: E) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let out_task = tokio::spawn(read_lines(machine.clone(), stdout, "out"));
        let err_task = tokio::spawn(read_lines(machine, stderr, "err"));
        Self { out_task: Some(out_task), err_task: Some(err_task) }
    }
}

async fn read_lines<R>(machine: MachineUrl, pipe: R, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::info!(machine = %machine, stream, "{line}"),
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(machine = %machine, stream, %error, "log pipe read failed");
                break;
            }
        }
    }
}

impl Drop for MachineLogger {
    fn drop(&mut self) {
        if let Some(task) = self.out_task.take() {
            task.abort();
        }
        if let Some(task) = self.err_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
