// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `IsolateClient` (spec §4.6): agent discovery, the two-phase
//! `CreateMachine`/`RunMachine` handshake, and tearing the session
//! back down.

use crate::discovery::AgentDiscoveryPolicy;
use crate::remote_machine::RemoteMachine;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::Request;
use zuri_core::{new_session_id, MachineUrl, Status};
use zuri_security::{well_known_sessions_root, CertificateSigner, EndpointCsr, LocalCertificateSigner, RunDirectory, SessionCa};
use zuri_wire::invoke_service_client::InvokeServiceClient;
use zuri_wire::{ConfigMap, CreateMachineRequest, PortDescriptor, RequestedPort, RunMachineRequest, SignedEndpoint};

/// Certificates minted by this system carry only a `CommonName`, no
/// Subject Alternative Name (spec.md is silent on certificate
/// conventions; `zuri_security::EndpointCsr::generate` takes only a
/// common name — see DESIGN.md). Modern TLS hostname verification
/// checks SAN, not CN, so a real per-endpoint hostname can't be
/// validated with what these certs carry. This constant is a
/// syntactically valid placeholder passed to every `domain_name()`
/// call in this crate, recorded as a known gap rather than silently
/// worked around.
const SERVER_NAME_PLACEHOLDER: &str = "localhost";

const SESSION_CA_VALIDITY: Duration = Duration::from_secs(24 * 3600);
const ENDPOINT_VALIDITY: Duration = Duration::from_secs(3600);
const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);
const REGISTRATION_POLL: Duration = Duration::from_millis(50);

fn to_status(action: &str, err: impl std::fmt::Display) -> Status {
    Status::agent_error(format!("failed to {action}: {err}"))
}

/// How the agent binary is found and launched when a policy calls for
/// spawning one (`AlwaysSpawn`, or `SpawnIfMissing`'s fallback).
pub struct SpawnOptions {
    pub agent_binary: PathBuf,
    pub agent_name: String,
    pub listen_transport: AgentListenTransport,
    pub registration_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentListenTransport {
    Unix,
    Tcp4,
}

impl AgentListenTransport {
    fn as_flag(self) -> &'static str {
        match self {
            AgentListenTransport::Unix => "unix",
            AgentListenTransport::Tcp4 => "tcp4",
        }
    }
}

/// Holds the mTLS identity and signing capability this client uses
/// for the lifetime of one session, plus (if it spawned the agent)
/// the child process and run directory to tear down on `shutdown()`.
pub struct IsolateClient {
    invoke_client: InvokeServiceClient<Channel>,
    signer: Box<dyn CertificateSigner>,
    ca_bundle_pem: String,
    client_certificate_pem: String,
    client_private_key_pem: String,
    spawned_agent: Option<SpawnedAgent>,
}

struct SpawnedAgent {
    child: tokio::process::Child,
    run_dir_root: PathBuf,
}

impl IsolateClient {
    /// Implements spec §4.6's agent discovery policy.
    pub async fn initialize(policy: AgentDiscoveryPolicy, spawn_options: SpawnOptions) -> Result<Self, Status> {
        match policy {
            AgentDiscoveryPolicy::UseSpecifiedEndpoint { endpoint_uri, credentials } => {
                Self::connect_with_credentials(&endpoint_uri, credentials).await
            }
            AgentDiscoveryPolicy::SpawnIfMissing { endpoint_uri, credentials } => {
                match Self::connect_with_credentials(&endpoint_uri, credentials).await {
                    Ok(client) => Ok(client),
                    Err(_) => Self::spawn_agent(spawn_options).await,
                }
            }
            AgentDiscoveryPolicy::AlwaysSpawn => Self::spawn_agent(spawn_options).await,
        }
    }

    async fn connect_with_credentials(
        endpoint_uri: &str,
        credentials: crate::discovery::ClientCredentials,
    ) -> Result<Self, Status> {
        let ca = SessionCa::load(&credentials.ca_certificate_pem, &credentials.ca_private_key_pem)?;
        let signer = LocalCertificateSigner::new(ca);
        let client_csr = EndpointCsr::generate("dev.zuri.client")?;
        let client_certificate_pem = signer.sign_session(&client_csr.csr_pem, ENDPOINT_VALIDITY)?;

        let tls_config = zuri_transport::tls::client_tls_config(
            client_certificate_pem.as_bytes(),
            client_csr.private_key_pem.as_bytes(),
            credentials.ca_certificate_pem.as_bytes(),
            SERVER_NAME_PLACEHOLDER,
        )?;
        let channel = zuri_transport::client::connect(endpoint_uri, tls_config).await?;

        Ok(Self {
            invoke_client: InvokeServiceClient::new(channel),
            signer: Box::new(signer),
            ca_bundle_pem: credentials.ca_certificate_pem,
            client_certificate_pem,
            client_private_key_pem: client_csr.private_key_pem,
            spawned_agent: None,
        })
    }

    /// `AgentDiscoveryPolicy::AlwaysSpawn` (spec §4.6): mints a fresh
    /// session CA, signs the agent's own certificate, writes the run
    /// directory, starts `zuria --background`, and polls for its
    /// listening endpoint.
    async fn spawn_agent(options: SpawnOptions) -> Result<Self, Status> {
        let ca = SessionCa::generate(&format!("dev.zuri.session:{}", new_session_id()), SESSION_CA_VALIDITY)?;
        let ca_bundle_pem = ca.ca_certificate_pem();
        let ca_private_key_pem = ca.ca_private_key_pem();

        let run_dir = RunDirectory::create(&well_known_sessions_root(), &options.agent_name)?;
        let run_dir_root = run_dir.root().to_path_buf();
        run_dir.write_secret(&run_dir.ca_certificate_file(), &ca_bundle_pem)?;
        run_dir.write_secret(&run_dir.ca_private_key_file(), &ca_private_key_pem)?;
        run_dir.write_secret(&run_dir.root_ca_bundle_file(), &ca_bundle_pem)?;

        let signer = LocalCertificateSigner::new(ca);
        let agent_csr = EndpointCsr::generate(&format!("dev.zuri.agent:{}", options.agent_name))?;
        let agent_certificate_pem = signer.sign_session(&agent_csr.csr_pem, ENDPOINT_VALIDITY)?;
        run_dir.write_secret(&run_dir.agent_certificate_file(), &agent_certificate_pem)?;
        run_dir.write_secret(&run_dir.agent_private_key_file(), &agent_csr.private_key_pem)?;

        let child = tokio::process::Command::new(&options.agent_binary)
            .arg("--agent-name")
            .arg(&options.agent_name)
            .arg("--listen-transport")
            .arg(options.listen_transport.as_flag())
            .arg("--background")
            .arg("--certificate")
            .arg(run_dir.agent_certificate_file())
            .arg("--private-key")
            .arg(run_dir.agent_private_key_file())
            .arg("--ca-bundle")
            .arg(run_dir.root_ca_bundle_file())
            .arg("--temporary-session")
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|err| to_status("spawn agent process", err))?;

        let endpoint_uri = poll_agent_endpoint(&run_dir, options.registration_timeout).await?;

        let client_csr = EndpointCsr::generate("dev.zuri.client")?;
        let client_certificate_pem = signer.sign_session(&client_csr.csr_pem, ENDPOINT_VALIDITY)?;

        let tls_config = zuri_transport::tls::client_tls_config(
            client_certificate_pem.as_bytes(),
            client_csr.private_key_pem.as_bytes(),
            ca_bundle_pem.as_bytes(),
            SERVER_NAME_PLACEHOLDER,
        )?;
        let channel = zuri_transport::client::connect(&endpoint_uri, tls_config).await?;

        Ok(Self {
            invoke_client: InvokeServiceClient::new(channel),
            signer: Box::new(signer),
            ca_bundle_pem,
            client_certificate_pem,
            client_private_key_pem: client_csr.private_key_pem,
            spawned_agent: Some(SpawnedAgent { child, run_dir_root }),
        })
    }

    /// `IsolateClient::spawn` (spec §4.6): `CreateMachine`, sign every
    /// returned endpoint CSR, `RunMachine`, then open an mTLS channel
    /// to the worker's control endpoint for `RemoteMachine`.
    pub async fn spawn(
        &mut self,
        name: impl Into<String>,
        execution_uri: impl Into<String>,
        config: &ConfigMap,
        ports: &[PortDescriptor],
        start_suspended: bool,
    ) -> Result<RemoteMachine, Status> {
        let request = CreateMachineRequest {
            name: name.into(),
            execution_uri: execution_uri.into(),
            config_json: config.to_json_bytes(),
            requested_ports: ports.iter().map(RequestedPort::from).collect(),
            start_suspended,
        };

        let create_result = self
            .invoke_client
            .create_machine(Request::new(request))
            .await
            .map_err(|err| Status::agent_unreachable(format!("CreateMachine failed: {err}")))?
            .into_inner();

        let signed_endpoints = create_result
            .endpoints
            .iter()
            .map(|endpoint| {
                let certificate_pem = self.signer.sign_endpoint(&endpoint.csr_pem, ENDPOINT_VALIDITY)?;
                Ok(SignedEndpoint { protocol_uri: endpoint.protocol_uri.clone(), certificate_pem })
            })
            .collect::<Result<Vec<_>, Status>>()?;

        self.invoke_client
            .run_machine(Request::new(RunMachineRequest {
                machine_uri: create_result.machine_uri.clone(),
                endpoints: signed_endpoints,
            }))
            .await
            .map_err(|err| Status::agent_unreachable(format!("RunMachine failed: {err}")))?;

        let tls_config = zuri_transport::tls::client_tls_config(
            self.client_certificate_pem.as_bytes(),
            self.client_private_key_pem.as_bytes(),
            self.ca_bundle_pem.as_bytes(),
            SERVER_NAME_PLACEHOLDER,
        )?;
        let worker_channel = zuri_transport::client::connect(&create_result.control_endpoint_uri, tls_config).await?;

        let machine_url = MachineUrl::parse(create_result.machine_uri)?;
        RemoteMachine::connect(machine_url, worker_channel).await
    }

    /// Tears the session down: terminates the agent process this
    /// client spawned (if any) and removes its run directory. A
    /// client that connected via `UseSpecifiedEndpoint` to an agent it
    /// did not spawn has nothing local to tear down.
    pub async fn shutdown(mut self) -> Result<(), Status> {
        let Some(mut spawned) = self.spawned_agent.take() else {
            return Ok(());
        };
        if let Some(pid) = spawned.child.id() {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
        let _ = spawned.child.wait().await;
        let _ = std::fs::remove_dir_all(&spawned.run_dir_root);
        Ok(())
    }
}

async fn poll_agent_endpoint(run_dir: &RunDirectory, timeout: Duration) -> Result<String, Status> {
    let path = run_dir.agent_endpoint_file();
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            if !contents.is_empty() {
                return Ok(contents);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(Status::agent_unreachable(format!(
                "timed out waiting for the agent to register its endpoint at {}",
                path.display()
            )));
        }
        tokio::time::sleep(REGISTRATION_POLL).await;
    }
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            agent_binary: PathBuf::from("zuria"),
            agent_name: new_session_id(),
            listen_transport: AgentListenTransport::Unix,
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
        }
    }
}
