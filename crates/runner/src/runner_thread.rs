// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's dedicated interpreter thread (spec §4.2). The
//! interpreter runs here, separate from the event-loop/async-runtime
//! thread, so it may block in compute for long periods without
//! stalling RPC, and so RPC handlers can deliver steering commands by
//! pushing into the command mailbox without reentering the interpreter.

use crate::interpreter::{ExecutionOutcome, Interpreter, Interrupts};
use crate::transition::dispatch;
use std::thread::JoinHandle;
use zuri_core::{Command, Reply, RunnerState};
use zuri_mailbox::Mailbox;

/// Feeds a runner thread's command mailbox to an [`Interpreter`] as a
/// non-blocking lookahead, via `try_take` — consuming a command this
/// way counts as having handled it, matching the table's `Running` row.
struct MailboxInterrupts<'a> {
    commands: &'a Mailbox<Command>,
}

impl Interrupts for MailboxInterrupts<'_> {
    fn poll(&self) -> Option<Command> {
        self.commands.try_take()
    }
}

/// Owns the dedicated OS thread hosting one interpreter run and the
/// two mailboxes ([`Command`] in, [`Reply`] out) used to steer it.
pub struct RunnerThread {
    commands: Mailbox<Command>,
    replies: Mailbox<Reply>,
    handle: Option<JoinHandle<()>>,
}

impl RunnerThread {
    /// Spawns the thread and starts pumping the command mailbox.
    /// `interpreter` begins in [`RunnerState::Initial`] and does not
    /// run until the first `Resume` command arrives.
    #[allow(clippy::expect_used)]
    pub fn spawn(mut interpreter: Box<dyn Interpreter>) -> Self {
        let commands: Mailbox<Command> = Mailbox::new();
        let replies: Mailbox<Reply> = Mailbox::new();
        let thread_commands = commands.clone();
        let thread_replies = replies.clone();

        let handle = std::thread::Builder::new()
            .name("zuri-runner".into())
            .spawn(move || run_loop(&thread_commands, &thread_replies, interpreter.as_mut()))
            .expect("OS refused to spawn the runner thread");

        replies.initialize();
        commands.initialize();
        Self { commands, replies, handle: Some(handle) }
    }

    /// Handle to the command side: send [`Command::Resume`],
    /// [`Command::Suspend`], or [`Command::Terminate`] from any thread.
    pub fn commands(&self) -> &Mailbox<Command> {
        &self.commands
    }

    /// Handle to the reply side: whoever holds the runner (typically
    /// the `RemotingService`) consumes these.
    pub fn replies(&self) -> &Mailbox<Reply> {
        &self.replies
    }

    /// Sends a final `Terminate`, closes the command mailbox, and
    /// waits for the thread to exit. A runner that was never resumed
    /// observes exactly one reply from this: `Cancelled`. Any commands
    /// still queued after that are dropped with a logged warning (the
    /// mailbox's own `Drop`).
    pub fn join(mut self) {
        self.commands.send(Command::Terminate);
        self.commands.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunnerThread {
    fn drop(&mut self) {
        self.commands.send(Command::Terminate);
        self.commands.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(commands: &Mailbox<Command>, replies: &Mailbox<Reply>, interpreter: &mut dyn Interpreter) {
    let mut state = RunnerState::Initial;
    loop {
        let Some(command) = commands.wait_for_message() else { return };
        let step = dispatch(&state, command);
        state = step.next_state;
        if let Some(reply) = step.reply {
            replies.send(reply);
        }
        if step.execute {
            let outcome = interpreter.run(&MailboxInterrupts { commands });
            let (next_state, reply) = outcome_to_transition(outcome);
            state = next_state;
            replies.send(reply);
        }
    }
}

fn outcome_to_transition(outcome: ExecutionOutcome) -> (RunnerState, Reply) {
    match outcome {
        ExecutionOutcome::Completed(_) => (RunnerState::Shutdown, Reply::Completed),
        ExecutionOutcome::Interrupted => (RunnerState::Stopped, Reply::Suspended),
        ExecutionOutcome::Terminated => (RunnerState::Shutdown, Reply::Cancelled),
        ExecutionOutcome::Failed(status) => (RunnerState::Failed(status.clone()), Reply::Failure(status)),
    }
}

#[cfg(test)]
#[path = "runner_thread_tests.rs"]
mod tests;
