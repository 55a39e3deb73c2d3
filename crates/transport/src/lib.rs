// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The gRPC/mTLS plumbing between isolate client, agent, and worker
//! (spec §4.3, §4.5, §6): the worker-side `RemotingService`
//! implementation, the per-stream pending-write queue, the `Monitor`
//! lifecycle feed, the init-complete barrier for `startSuspended`
//! workers, and the TLS config builders every endpoint shares.

pub mod client;
mod init_barrier;
mod monitor;
mod pending_write;
mod registry;
mod remoting_server;
pub mod tls;
pub mod uds;

pub use init_barrier::InitBarrier;
pub use monitor::{MonitorEventRecord, MonitorFeed};
pub use pending_write::{FrameWriter, PendingWriteQueue};
pub use registry::PortRegistry;
pub use remoting_server::RemotingServiceImpl;
