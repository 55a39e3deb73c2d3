// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod cli;

use cli::{Cli, Command, RunArgs};
use std::time::Duration;
use zuri_client::{AgentDiscoveryPolicy, ClientCredentials, IsolateClient, SpawnOptions};
use zuri_core::new_session_id;
use zuri_wire::ConfigMap;

fn main() {
    let cli = Cli::parse_args();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    let Command::Run(args) = cli.command;
    let exit_code = runtime.block_on(run(args));
    std::process::exit(exit_code);
}

async fn run(args: RunArgs) -> i32 {
    match run_inner(args).await {
        Ok(status_code) => status_code,
        Err(err) => {
            eprintln!("zuri run: {err}");
            1
        }
    }
}

async fn run_inner(args: RunArgs) -> Result<i32, zuri_core::Status> {
    let policy = match (&args.agent_endpoint, &args.ca_certificate, &args.ca_private_key) {
        (Some(endpoint_uri), Some(ca_certificate), Some(ca_private_key)) => {
            let credentials = ClientCredentials {
                ca_certificate_pem: read_to_string(ca_certificate)?,
                ca_private_key_pem: read_to_string(ca_private_key)?,
            };
            AgentDiscoveryPolicy::SpawnIfMissing { endpoint_uri: endpoint_uri.clone(), credentials }
        }
        _ => AgentDiscoveryPolicy::AlwaysSpawn,
    };

    let spawn_options = SpawnOptions {
        agent_binary: args.agent_binary,
        agent_name: new_session_id(),
        listen_transport: args.listen_transport.into(),
        registration_timeout: Duration::from_secs(args.registration_timeout_secs),
    };

    let mut client = IsolateClient::initialize(policy, spawn_options).await?;

    let config: ConfigMap = args.config.into_iter().collect();
    let machine = client.spawn(args.name, args.execution_uri, &config, &[], args.start_suspended).await?;

    tracing::info!(machine = %machine.url(), "machine running, waiting for completion");
    let exit = tokio::task::block_in_place(|| {
        machine.run_until_finished(|state| tracing::info!(?state, "machine state changed"))
    })?;

    client.shutdown().await?;

    Ok(exit.status_code)
}

fn read_to_string(path: &std::path::Path) -> Result<String, zuri_core::Status> {
    std::fs::read_to_string(path)
        .map_err(|err| zuri_core::Status::invalid_configuration(format!("failed to read {}: {err}", path.display())))
}
