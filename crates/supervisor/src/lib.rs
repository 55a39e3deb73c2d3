// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The agent-side process supervisor (spec §4.1): spawns worker
//! processes on demand, pipes their standard streams into structured
//! logs, reaps exits, and fans machine-lifecycle events out to its
//! RPC-facing subscribers. Never executes user code itself — it only
//! opens pipes, spawns, signals, and waits.

mod logger;
mod process;
mod supervisor;

pub use logger::MachineLogger;
pub use process::MachineProcess;
pub use supervisor::{MachineExited, MachineSupervisor, SupervisorError};
