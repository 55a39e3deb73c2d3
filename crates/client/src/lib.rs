// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The isolate client (spec §4.6): discovers or spawns an agent,
//! drives the `CreateMachine`/`RunMachine` handshake, and returns a
//! `RemoteMachine` handle whose `run_until_finished` blocks the
//! caller's thread until the machine reaches a terminal state.

pub mod discovery;
pub mod isolate_client;
pub mod monitor;
pub mod remote_machine;

pub use discovery::{AgentDiscoveryPolicy, ClientCredentials};
pub use isolate_client::{AgentListenTransport, IsolateClient, SpawnOptions};
pub use monitor::MachineExit;
pub use remote_machine::RemoteMachine;
