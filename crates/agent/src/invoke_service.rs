// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent-facing `InvokeService` (spec §4.6, §6): spawns a worker
//! process per `CreateMachine` call and relays its CSR/certificate
//! through the run directory's per-machine handshake files, then
//! forwards the isolate client's signed certificate back down via
//! `RunMachine`.

use crate::machine_registry::MachineRegistry;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tonic::{Request, Response, Status as TonicStatus};
use zuri_core::{new_machine_id, Invoker, MachineUrl, Status};
use zuri_security::{machine_handshake_dir, RunDirectory};
use zuri_supervisor::MachineSupervisor;
use zuri_wire::invoke_service_server::InvokeService as InvokeServiceTrait;
use zuri_wire::{
    ConfigMap, CreateMachineRequest, CreateMachineResult, CsrAnnouncement, EndpointDescriptor,
    RunMachineRequest, RunMachineResult, RunSignal,
};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const HANDSHAKE_POLL: Duration = Duration::from_millis(25);

fn to_tonic(status: Status) -> TonicStatus {
    TonicStatus::internal(status.to_string())
}

/// Implements the agent's half of spec §4.6's handshake. Holds no
/// machine state of its own beyond the url -> worker-id mapping
/// [`MachineRegistry`] tracks; everything else lives in the
/// [`MachineSupervisor`] or on disk under the run directory.
pub struct InvokeServiceImpl {
    supervisor: MachineSupervisor,
    run_dir: PathBuf,
    worker_binary: PathBuf,
    registry: MachineRegistry,
    last_activity: Mutex<Instant>,
}

impl InvokeServiceImpl {
    pub fn new(supervisor: MachineSupervisor, run_dir: PathBuf, worker_binary: PathBuf) -> Self {
        Self {
            supervisor,
            run_dir,
            worker_binary,
            registry: MachineRegistry::default(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// How long it has been since the last `CreateMachine` call, for
    /// the `--idle-timeout` watchdog in `run.rs`.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }
}

#[async_trait]
impl InvokeServiceTrait for InvokeServiceImpl {
    async fn create_machine(
        &self,
        request: Request<CreateMachineRequest>,
    ) -> Result<Response<CreateMachineResult>, TonicStatus> {
        self.touch();
        let req = request.into_inner();
        ConfigMap::from_json_bytes(&req.config_json).map_err(to_tonic)?;

        let machine_id = new_machine_id();
        let machine_url = MachineUrl::parse(format!("dev.zuri.machine:{machine_id}")).map_err(to_tonic)?;

        let handshake_dir = RunDirectory::attach(self.run_dir.clone())
            .create_machine_dir(&machine_id)
            .map_err(to_tonic)?;

        let argv = worker_argv(&self.run_dir, &machine_id, machine_url.as_str(), &req);
        let invoker = Invoker::new(self.worker_binary.clone(), argv);
        self.supervisor
            .spawn(machine_url.clone(), invoker, self.run_dir.clone())
            .await
            .map_err(|err| TonicStatus::internal(format!("failed to spawn worker: {err}")))?;

        let announcement =
            CsrAnnouncement::read_with_timeout(&handshake_dir.join("control.csr.json"), HANDSHAKE_TIMEOUT, HANDSHAKE_POLL)
                .map_err(to_tonic)?;

        self.registry.insert(machine_url.clone(), machine_id);

        let endpoints = req
            .requested_ports
            .iter()
            .map(|port| EndpointDescriptor {
                protocol_uri: port.protocol_uri.clone(),
                endpoint_uri: announcement.endpoint_uri.clone(),
                csr_pem: announcement.csr_pem.clone(),
            })
            .collect();

        Ok(Response::new(CreateMachineResult {
            machine_uri: machine_url.as_str().to_string(),
            control_endpoint_uri: announcement.endpoint_uri,
            endpoints,
        }))
    }

    async fn run_machine(
        &self,
        request: Request<RunMachineRequest>,
    ) -> Result<Response<RunMachineResult>, TonicStatus> {
        self.touch();
        let req = request.into_inner();
        let machine_url = MachineUrl::parse(req.machine_uri.clone()).map_err(to_tonic)?;
        let machine_id = self
            .registry
            .get(&machine_url)
            .ok_or_else(|| TonicStatus::not_found(format!("no such machine: {}", req.machine_uri)))?;

        let certificate_pem = req
            .endpoints
            .first()
            .ok_or_else(|| TonicStatus::invalid_argument("RunMachineRequest carried no signed endpoints"))?
            .certificate_pem
            .clone();

        let handshake_dir = machine_handshake_dir(&self.run_dir, &machine_id);
        RunSignal { certificate_pem, server_name: None }
            .write(&handshake_dir.join("control.run.json"))
            .map_err(to_tonic)?;

        Ok(Response::new(RunMachineResult { server_name_overrides: Vec::new() }))
    }
}

/// Builds `zuriw`'s argv for a newly created machine — this port's own
/// CLI surface (see `zuri_worker::WorkerArgs`), since spec.md never
/// documents one.
fn worker_argv(run_dir: &std::path::Path, machine_id: &str, machine_url: &str, req: &CreateMachineRequest) -> Vec<String> {
    let mut argv = vec![
        "--run-dir".to_string(),
        run_dir.display().to_string(),
        "--machine-id".to_string(),
        machine_id.to_string(),
        "--machine-url".to_string(),
        machine_url.to_string(),
        "--execution-uri".to_string(),
        req.execution_uri.clone(),
        "--config-json".to_string(),
        String::from_utf8_lossy(&req.config_json).to_string(),
    ];
    for port in &req.requested_ports {
        argv.push("--port".to_string());
        argv.push(port.protocol_uri.clone());
    }
    if req.start_suspended {
        argv.push("--start-suspended".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_argv_carries_every_requested_port() {
        let req = CreateMachineRequest {
            name: "demo".to_string(),
            execution_uri: "dev.zuri.pkg:hello".to_string(),
            config_json: b"{}".to_vec(),
            requested_ports: vec![
                zuri_wire::RequestedPort {
                    protocol_uri: "dev.zuri.proto:a".to_string(),
                    port_type: 0,
                    port_direction: 0,
                },
                zuri_wire::RequestedPort {
                    protocol_uri: "dev.zuri.proto:b".to_string(),
                    port_type: 1,
                    port_direction: 2,
                },
            ],
            start_suspended: true,
        };
        let argv = worker_argv(std::path::Path::new("/tmp/run"), "mch-1", "dev.zuri.machine:mch-1", &req);
        assert_eq!(argv.iter().filter(|arg| *arg == "--port").count(), 2);
        assert!(argv.contains(&"dev.zuri.proto:a".to_string()));
        assert!(argv.contains(&"dev.zuri.proto:b".to_string()));
        assert!(argv.contains(&"--start-suspended".to_string()));
    }
}
