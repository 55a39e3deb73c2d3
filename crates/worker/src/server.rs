// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires one worker process's `RunnerThread` + `PortRegistry` +
//! `InitBarrier` into a `RemotingServiceImpl`, completes the CSR/
//! certificate handshake with its parent agent (spec §4.6), and
//! serves the result over mTLS.
//!
//! Single-endpoint simplification (recorded in DESIGN.md): every
//! requested port and the control surface are served from one TLS
//! listener under one worker-minted certificate, since `Communicate`
//! already multiplexes per-port traffic via the
//! `x-zuri-protocol-url` metadata key — there is no second listener
//! to bind per declared port.

use crate::cli::WorkerArgs;
use crate::interpreter::PlaceholderInterpreter;
use crate::ports::parse_ports;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use zuri_core::Status;
use zuri_runner::RunnerThread;
use zuri_security::{machine_handshake_dir, EndpointCsr};
use zuri_transport::{tls, InitBarrier, PortRegistry, RemotingServiceImpl};
use zuri_wire::remoting_service_server::RemotingServiceServer;
use zuri_wire::{CsrAnnouncement, RunSignal};

const HANDSHAKE_POLL: Duration = Duration::from_millis(25);

/// Runs the worker until its `RemotingService` listener returns (the
/// process is expected to exit shortly after, once the runner has
/// reached a terminal state and the supervisor has reaped it).
pub async fn run(args: WorkerArgs) -> Result<(), Status> {
    let protocol_urls = parse_ports(&args.ports)?;
    let ports = Arc::new(PortRegistry::new(protocol_urls.iter().cloned()));
    let runner = Arc::new(RunnerThread::spawn(Box::new(PlaceholderInterpreter)));
    let init_barrier = Arc::new(if args.start_suspended {
        InitBarrier::new(protocol_urls.iter().map(|url| url.as_str().to_string()))
    } else {
        InitBarrier::always_satisfied()
    });

    let service = RemotingServiceImpl::new(Arc::clone(&runner), ports, init_barrier);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| Status::agent_error(format!("failed to bind worker listener: {err}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| Status::agent_error(format!("failed to read bound worker address: {err}")))?;
    let endpoint_uri = format!("tcp4:{local_addr}");

    let handshake_dir = machine_handshake_dir(&args.run_dir, &args.machine_id);
    let csr = EndpointCsr::generate(&args.machine_url)?;
    CsrAnnouncement { endpoint_uri: endpoint_uri.clone(), csr_pem: csr.csr_pem.clone() }
        .write(&handshake_dir.join("control.csr.json"))?;

    tracing::info!(
        machine = %args.machine_url,
        endpoint = %endpoint_uri,
        "announced control endpoint CSR, awaiting signed certificate"
    );

    let signal = RunSignal::read_with_timeout(
        &handshake_dir.join("control.run.json"),
        Duration::from_secs(args.handshake_timeout_secs),
        HANDSHAKE_POLL,
    )?;

    let ca_bundle_pem = fs::read(args.run_dir.join("root-ca-bundle.pem"))
        .map_err(|err| Status::agent_error(format!("failed to read root CA bundle: {err}")))?;
    let tls_config = tls::server_tls_config(
        signal.certificate_pem.as_bytes(),
        csr.private_key_pem.as_bytes(),
        &ca_bundle_pem,
    )?;

    tracing::info!(machine = %args.machine_url, "certificate received, serving RemotingService");

    Server::builder()
        .tls_config(tls_config)
        .map_err(|err| Status::agent_error(format!("failed to configure worker TLS: {err}")))?
        .add_service(RemotingServiceServer::new(service))
        .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
        .await
        .map_err(|err| Status::agent_error(format!("RemotingService server failed: {err}")))
}
