// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in for the out-of-scope bytecode interpreter (spec §1):
//! `zuriw` links against `zuri_runner::Interpreter` only through this
//! trait, never a real VM. A production build would replace this
//! module wholesale with a binding into the actual interpreter; this
//! placeholder exists so the worker binary is runnable end to end.

use zuri_core::Command;
use zuri_runner::{ExecutionOutcome, Interpreter, Interrupts};

/// Completes immediately with exit value `0`, unless a `Suspend` or
/// `Terminate` was already queued by the time execution starts — in
/// which case it honors that instead, matching spec §8 scenario 2/3
/// ("construct-then-drop" observes a `Cancelled` reply without ever
/// reaching `Completed`).
#[derive(Debug, Default)]
pub struct PlaceholderInterpreter;

impl Interpreter for PlaceholderInterpreter {
    fn run(&mut self, interrupts: &dyn Interrupts) -> ExecutionOutcome {
        match interrupts.poll() {
            Some(Command::Suspend) => ExecutionOutcome::Interrupted,
            Some(Command::Terminate) => ExecutionOutcome::Terminated,
            Some(Command::Resume) | None => ExecutionOutcome::Completed(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<Command>);

    impl Interrupts for Fixed {
        fn poll(&self) -> Option<Command> {
            self.0
        }
    }

    #[test]
    fn completes_when_nothing_pending() {
        let mut interpreter = PlaceholderInterpreter;
        assert!(matches!(interpreter.run(&Fixed(None)), ExecutionOutcome::Completed(0)));
    }

    #[test]
    fn honors_a_pending_terminate() {
        let mut interpreter = PlaceholderInterpreter;
        assert!(matches!(interpreter.run(&Fixed(Some(Command::Terminate))), ExecutionOutcome::Terminated));
    }
}
