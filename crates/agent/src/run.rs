// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuria` startup orchestration (spec §6): attaches to the run
//! directory the isolate client prepared, binds the chosen transport,
//! and serves `InvokeService` until idle-timeout or a terminating
//! signal arrives.

use crate::cli::{AgentArgs, ListenTransport};
use crate::invoke_service::InvokeServiceImpl;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use zuri_core::Status;
use zuri_security::{well_known_sessions_root, RunDirectory};
use zuri_supervisor::MachineSupervisor;
use zuri_wire::invoke_service_server::{InvokeService as _, InvokeServiceServer};

const IDLE_POLL: Duration = Duration::from_secs(1);

fn to_status(action: &str, err: impl std::fmt::Display) -> Status {
    Status::agent_error(format!("failed to {action}: {err}"))
}

/// Locates this binary's sibling `zuriw`, assuming the conventional
/// packaging layout where both land in the same directory (this
/// port's own packaging convention — spec.md never names one).
fn worker_binary_path() -> std::path::PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join("zuriw")))
        .unwrap_or_else(|| std::path::PathBuf::from("zuriw"))
}

pub async fn run(args: AgentArgs) -> Result<(), Status> {
    let run_dir_root = well_known_sessions_root().join(&args.agent_name);
    fs::create_dir_all(&run_dir_root).map_err(|err| to_status("create run directory", err))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions =
            fs::metadata(&run_dir_root).map_err(|err| to_status("stat run directory", err))?.permissions();
        permissions.set_mode(0o700);
        fs::set_permissions(&run_dir_root, permissions).map_err(|err| to_status("chmod run directory", err))?;
    }
    let run_dir = RunDirectory::attach(run_dir_root.clone());

    let certificate_pem = fs::read(&args.certificate).map_err(|err| to_status("read certificate", err))?;
    let private_key_pem = fs::read(&args.private_key).map_err(|err| to_status("read private key", err))?;
    let ca_bundle_pem = fs::read(&args.ca_bundle).map_err(|err| to_status("read CA bundle", err))?;
    let tls_config = zuri_transport::tls::server_tls_config(&certificate_pem, &private_key_pem, &ca_bundle_pem)?;

    let supervisor = MachineSupervisor::new();
    supervisor
        .initialize()
        .map_err(|err| Status::runtime_invariant(format!("supervisor already initialized: {err}")))?;

    let service = Arc::new(InvokeServiceImpl::new(supervisor.clone(), run_dir_root.clone(), worker_binary_path()));
    let idle_timeout = args.idle_timeout.map(Duration::from_secs);
    if let Some(timeout) = idle_timeout {
        let watchdog_service = Arc::clone(&service);
        let watchdog_supervisor = supervisor.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(IDLE_POLL).await;
                if watchdog_service.idle_for() >= timeout {
                    tracing::info!("idle timeout elapsed, shutting down");
                    watchdog_supervisor.shutdown().await;
                    std::process::exit(0);
                }
            }
        });
    }

    let invoke_service = InvokeServiceImplWrapper(service);
    let server = Server::builder()
        .tls_config(tls_config)
        .map_err(|err| to_status("configure agent TLS", err))?
        .add_service(InvokeServiceServer::new(invoke_service));

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received shutdown signal");
    };

    let serve_result = match args.listen_transport {
        ListenTransport::Unix => {
            let socket_path = run_dir.agent_socket_file();
            let _ = fs::remove_file(&socket_path);
            let listener =
                tokio::net::UnixListener::bind(&socket_path).map_err(|err| to_status("bind unix listener", err))?;
            fs::write(run_dir.agent_endpoint_file(), format!("unix:{}", socket_path.display()))
                .map_err(|err| to_status("write agent endpoint file", err))?;
            server
                .serve_with_incoming_shutdown(zuri_transport::uds::incoming(listener), shutdown_signal)
                .await
        }
        ListenTransport::Tcp4 => {
            let listener =
                tokio::net::TcpListener::bind("127.0.0.1:0").await.map_err(|err| to_status("bind tcp listener", err))?;
            let local_addr = listener.local_addr().map_err(|err| to_status("read bound address", err))?;
            fs::write(run_dir.agent_endpoint_file(), format!("tcp4:{local_addr}"))
                .map_err(|err| to_status("write agent endpoint file", err))?;
            server
                .serve_with_incoming_shutdown(tokio_stream::wrappers::TcpListenerStream::new(listener), shutdown_signal)
                .await
        }
    };

    supervisor.shutdown().await;
    if args.temporary_session {
        let _ = fs::remove_dir_all(&run_dir_root);
    }

    serve_result.map_err(|err| to_status("serve InvokeService", err))
}

/// `InvokeServiceServer::new` takes its service by value; this wraps
/// the shared `Arc<InvokeServiceImpl>` so the idle-timeout watchdog
/// above and the serving handler can both hold a reference to the
/// same instance.
struct InvokeServiceImplWrapper(Arc<InvokeServiceImpl>);

#[async_trait::async_trait]
impl zuri_wire::invoke_service_server::InvokeService for InvokeServiceImplWrapper {
    async fn create_machine(
        &self,
        request: tonic::Request<zuri_wire::CreateMachineRequest>,
    ) -> Result<tonic::Response<zuri_wire::CreateMachineResult>, tonic::Status> {
        self.0.create_machine(request).await
    }

    async fn run_machine(
        &self,
        request: tonic::Request<zuri_wire::RunMachineRequest>,
    ) -> Result<tonic::Response<zuri_wire::RunMachineResult>, tonic::Status> {
        self.0.run_machine(request).await
    }
}
