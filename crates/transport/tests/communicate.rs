// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end `Communicate` echo scenario (spec §8 scenario 5): a
//! `PortSocket` bound to a protocol URL attaches to a real server over
//! loopback TCP (no TLS — mTLS itself is covered by
//! `zuri_transport::tls`'s own unit tests and `zuri-security`'s
//! certificate round-trip test); writing a frame produces an inbound
//! `handle()` call within the deadline.

use std::time::Duration;
use tokio::net::TcpListener;
use tonic::transport::Server;
use zuri_core::{Command, ProtocolUrl};
use zuri_runner::{ExecutionOutcome, Interpreter, Interrupts, RunnerThread};
use zuri_transport::{InitBarrier, PortRegistry, RemotingServiceImpl};
use zuri_wire::remoting_service_client::RemotingServiceClient;
use zuri_wire::remoting_service_server::RemotingServiceServer;
use zuri_wire::{Message, MessageVersion, PROTOCOL_URL_METADATA_KEY};

struct NeverCompletes;

impl Interpreter for NeverCompletes {
    fn run(&mut self, interrupts: &dyn Interrupts) -> ExecutionOutcome {
        loop {
            if matches!(interrupts.poll(), Some(Command::Terminate)) {
                return ExecutionOutcome::Terminated;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

#[tokio::test]
async fn echo_communicate_round_trips_within_five_seconds() {
    let protocol_url = ProtocolUrl::parse("dev.zuri.proto:null").unwrap();

    let runner = std::sync::Arc::new(RunnerThread::spawn(Box::new(NeverCompletes)));
    let ports = std::sync::Arc::new(PortRegistry::new([protocol_url.clone()]));
    let socket = ports.get(protocol_url.as_str()).unwrap();
    let service = RemotingServiceImpl::new(runner, ports, std::sync::Arc::new(InitBarrier::always_satisfied()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);

    tokio::spawn(async move {
        let _ = Server::builder()
            .add_service(RemotingServiceServer::new(service))
            .serve_with_incoming(incoming)
            .await;
    });

    // Give the server a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let channel = tonic::transport::Channel::builder(format!("http://{addr}").parse().unwrap())
        .connect()
        .await
        .unwrap();
    let mut client = RemotingServiceClient::new(channel);

    let (tx, rx) = tokio::sync::mpsc::channel(4);
    let outbound = tokio_stream::wrappers::ReceiverStream::new(rx);
    let mut request = tonic::Request::new(outbound);
    request.metadata_mut().insert(PROTOCOL_URL_METADATA_KEY, protocol_url.as_str().parse().unwrap());

    let response = client.communicate(request).await.unwrap();
    let mut inbound = response.into_inner();

    tx.send(Message { version: MessageVersion::Version1 as i32, data: b"hello world".to_vec() })
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(payload) = socket.try_recv() {
            assert_eq!(payload, b"hello world".to_vec());
            break;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("handle() was not observed within the deadline");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // And the echo direction: the port's upper half can write back
    // out through the same attached stream.
    socket.send(b"and goodbye".to_vec()).unwrap();
    use futures::StreamExt;
    let echoed = tokio::time::timeout(Duration::from_secs(5), inbound.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(echoed.data, b"and goodbye".to_vec());
}
