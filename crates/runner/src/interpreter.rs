// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator seams for the bytecode interpreter and package cache —
//! both explicitly out of scope (spec §1). `zuri-runner` only defines
//! the trait boundary the real implementations plug into; everything
//! in this crate is written against these traits, never a concrete
//! interpreter.

use zuri_core::{Command, Status};

/// What one interpreter run (started by a `Resume`) ended with.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The bytecode ran to completion and produced an exit value.
    Completed(i64),
    /// A `Suspend` command was observed mid-run and honored.
    Interrupted,
    /// A `Terminate` command was observed mid-run and honored.
    Terminated,
    /// Any other interpreter error.
    Failed(Status),
}

/// Non-blocking lookahead into the command mailbox, handed to the
/// interpreter so it can notice a `Suspend`/`Terminate` between
/// bytecode steps without the runner thread re-entering the mailbox
/// itself (spec §4.2: "RPC callbacks can deliver steering commands
/// without reentering the interpreter").
pub trait Interrupts {
    /// Returns the next pending command, if any, without blocking.
    /// A `Resume` seen here is a no-op the interpreter should ignore
    /// and keep running.
    fn poll(&self) -> Option<Command>;
}

/// The out-of-scope bytecode interpreter.
pub trait Interpreter: Send {
    fn run(&mut self, interrupts: &dyn Interrupts) -> ExecutionOutcome;
}

/// The out-of-scope package cache.
pub trait PackageLoader: Send + Sync {
    fn load(&self, main_location: &str) -> Result<Vec<u8>, Status>;
}

/// A loader that never resolves anything; useful as a placeholder
/// where no package cache is wired up yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPackageLoader;

impl PackageLoader for NullPackageLoader {
    fn load(&self, main_location: &str) -> Result<Vec<u8>, Status> {
        Err(Status::invalid_configuration(format!(
            "no package loader configured; cannot resolve `{main_location}`"
        )))
    }
}
