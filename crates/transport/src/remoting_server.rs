// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker-side `RemotingService` (spec §4.3): wires a
//! [`RunnerThread`] and a [`PortRegistry`] to the four RPCs, using
//! [`PendingWriteQueue`] for outbound framing and [`MonitorFeed`] for
//! the `Monitor` lifecycle stream.

use crate::init_barrier::InitBarrier;
use crate::monitor::MonitorFeed;
use crate::pending_write::{FrameWriter, PendingWriteQueue};
use crate::registry::PortRegistry;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status as TonicStatus, Streaming};
use zuri_core::Command;
use zuri_runner::{PortWriter, RunnerThread};
use zuri_wire::remoting_service_server::RemotingService as RemotingServiceTrait;
use zuri_wire::{Empty, Message, MessageVersion, MonitorEvent, RpcStatus, PROTOCOL_URL_METADATA_KEY};

struct MpscFrameWriter {
    sender: tokio::sync::mpsc::Sender<Result<Message, TonicStatus>>,
}

#[async_trait]
impl FrameWriter for MpscFrameWriter {
    async fn write_frame(&self, frame: Vec<u8>) -> Result<(), ()> {
        let message = Message { version: MessageVersion::Version1 as i32, data: frame };
        self.sender.send(Ok(message)).await.map_err(|_| ())
    }
}

struct StreamPortWriter {
    queue: PendingWriteQueue<MpscFrameWriter>,
}

impl PortWriter for StreamPortWriter {
    fn write(&self, message: Vec<u8>) {
        self.queue.write(message);
    }
}

/// The worker's `RemotingService` implementation. One instance per
/// worker process, holding the single runner it hosts. `Clone`able so
/// the same service can be registered against more than one TLS
/// listener (the control endpoint and, were per-port listeners ever
/// split out, each of those too) without duplicating the runner.
#[derive(Clone)]
pub struct RemotingServiceImpl {
    runner: Arc<RunnerThread>,
    ports: Arc<PortRegistry>,
    monitor: MonitorFeed,
    init_barrier: Arc<InitBarrier>,
}

impl RemotingServiceImpl {
    /// Wires the service to `runner` and `ports`, spawns the task
    /// draining the runner's reply mailbox into the `Monitor` feed,
    /// and — if `init_barrier` is already satisfied (i.e. the worker
    /// was not started suspended) — issues the initial `Resume`.
    pub fn new(runner: Arc<RunnerThread>, ports: Arc<PortRegistry>, init_barrier: Arc<InitBarrier>) -> Self {
        let monitor = MonitorFeed::new();
        spawn_reply_drain(Arc::clone(&runner), monitor.clone());

        let service = Self { runner, ports, monitor, init_barrier };
        if service.init_barrier.is_satisfied() {
            service.runner.commands().send(Command::Resume);
        }
        service
    }

    pub fn monitor_feed(&self) -> MonitorFeed {
        self.monitor.clone()
    }
}

fn spawn_reply_drain(runner: Arc<RunnerThread>, monitor: MonitorFeed) {
    tokio::task::spawn_blocking(move || {
        while let Some(reply) = runner.replies().wait_for_message() {
            monitor.record_reply(&reply);
        }
    });
}

fn protocol_url_of<T>(request: &Request<T>) -> Result<String, TonicStatus> {
    request
        .metadata()
        .get(PROTOCOL_URL_METADATA_KEY)
        .ok_or_else(|| TonicStatus::invalid_argument(format!("missing {PROTOCOL_URL_METADATA_KEY} metadata")))?
        .to_str()
        .map(str::to_string)
        .map_err(|_| TonicStatus::invalid_argument(format!("{PROTOCOL_URL_METADATA_KEY} must be ASCII")))
}

#[async_trait]
impl RemotingServiceTrait for RemotingServiceImpl {
    type CommunicateStream = Pin<Box<dyn Stream<Item = Result<Message, TonicStatus>> + Send + 'static>>;

    async fn communicate(
        &self,
        request: Request<Streaming<Message>>,
    ) -> Result<Response<Self::CommunicateStream>, TonicStatus> {
        let protocol_url = protocol_url_of(&request)?;

        let socket = self
            .ports
            .get(&protocol_url)
            .ok_or_else(|| TonicStatus::not_found(format!("no port registered for {protocol_url}")))?;

        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let queue = PendingWriteQueue::new(Arc::new(MpscFrameWriter { sender: tx }));
        let writer = Box::new(StreamPortWriter { queue: queue.clone() });

        socket
            .attach(writer)
            .map_err(|_| TonicStatus::already_exists(format!("Communicate already attached for {protocol_url}")))?;

        if self.init_barrier.mark_attached(&protocol_url) {
            self.runner.commands().send(Command::Resume);
        }

        let mut inbound = request.into_inner();
        let socket_for_reader = Arc::clone(&socket);
        let queue_for_reader = queue.clone();
        tokio::spawn(async move {
            loop {
                match inbound.message().await {
                    Ok(Some(message)) => socket_for_reader.handle(message.data),
                    Ok(None) | Err(_) => break,
                }
            }
            socket_for_reader.detach();
            queue_for_reader.close();
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }

    type MonitorStream = Pin<Box<dyn Stream<Item = Result<MonitorEvent, TonicStatus>> + Send + 'static>>;

    async fn monitor(&self, _request: Request<Empty>) -> Result<Response<Self::MonitorStream>, TonicStatus> {
        let feed = self.monitor.clone();
        let stream = futures::stream::unfold(0usize, move |index| {
            let feed = feed.clone();
            async move {
                let event = feed.next_after(index).await?;
                Some((Ok(event.into_wire()), index + 1))
            }
        });
        Ok(Response::new(Box::pin(stream)))
    }

    async fn suspend(&self, _request: Request<Empty>) -> Result<Response<RpcStatus>, TonicStatus> {
        self.runner.commands().send(Command::Suspend);
        Ok(Response::new(RpcStatus { status_code: 0, message: "queued".to_string() }))
    }

    async fn resume(&self, _request: Request<Empty>) -> Result<Response<RpcStatus>, TonicStatus> {
        self.runner.commands().send(Command::Resume);
        Ok(Response::new(RpcStatus { status_code: 0, message: "queued".to_string() }))
    }

    async fn terminate(&self, _request: Request<Empty>) -> Result<Response<RpcStatus>, TonicStatus> {
        self.runner.commands().send(Command::Terminate);
        Ok(Response::new(RpcStatus { status_code: 0, message: "queued".to_string() }))
    }
}

#[cfg(test)]
#[path = "remoting_server_tests.rs"]
mod tests;
