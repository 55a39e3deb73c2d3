// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RemoteMachine` (spec §4.6): a handle to a machine running on a
//! worker this isolate client created — `Suspend`/`Resume`/`Terminate`
//! plus the blocking `run_until_finished` wait. Per the Open Question
//! decision in DESIGN.md, only `Terminate` is exposed; the source's
//! second `shutdown()` verb is not implemented.

use crate::monitor::{MachineExit, MachineMonitor};
use std::sync::Arc;
use tonic::transport::Channel;
use tonic::Request;
use zuri_core::{MachineUrl, Status};
use zuri_wire::remoting_service_client::RemotingServiceClient;
use zuri_wire::{Empty, MachineState};

fn to_status(action: &str, err: tonic::Status) -> Status {
    Status::agent_unreachable(format!("failed to {action}: {err}"))
}

/// A handle to one running machine, backed by an open mTLS channel to
/// its worker's `RemotingService`.
pub struct RemoteMachine {
    url: MachineUrl,
    client: tokio::sync::Mutex<RemotingServiceClient<Channel>>,
    monitor: Arc<MachineMonitor>,
}

impl RemoteMachine {
    pub(crate) async fn connect(url: MachineUrl, channel: Channel) -> Result<Self, Status> {
        let mut client = RemotingServiceClient::new(channel);
        let stream =
            client.monitor(Request::new(Empty {})).await.map_err(|err| to_status("subscribe to Monitor", err))?;
        let monitor = MachineMonitor::spawn(stream.into_inner());
        Ok(Self { url, client: tokio::sync::Mutex::new(client), monitor })
    }

    pub fn url(&self) -> &MachineUrl {
        &self.url
    }

    /// Blocks the calling thread until this machine reaches a terminal
    /// state (Completed / Cancelled / Failure), invoking `on_state` on
    /// every intermediate state observed. Must be called from outside
    /// the tokio runtime driving this client's async work — it is a
    /// synchronous facade over the background `Monitor` stream, not
    /// itself async (spec §4.6, §5).
    pub fn run_until_finished(&self, on_state: impl FnMut(MachineState)) -> Result<MachineExit, Status> {
        self.monitor.run_until_finished(on_state)
    }

    pub async fn suspend(&self) -> Result<(), Status> {
        self.client.lock().await.suspend(Request::new(Empty {})).await.map_err(|err| to_status("suspend", err))?;
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), Status> {
        self.client.lock().await.resume(Request::new(Empty {})).await.map_err(|err| to_status("resume", err))?;
        Ok(())
    }

    pub async fn terminate(&self) -> Result<(), Status> {
        self.client.lock().await.terminate(Request::new(Empty {})).await.map_err(|err| to_status("terminate", err))?;
        Ok(())
    }
}
