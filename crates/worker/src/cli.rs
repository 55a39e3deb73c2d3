// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuriw`'s command-line surface. Unlike the agent binary (spec §6
//! names its flags exhaustively), nothing in spec.md documents a
//! worker CLI — a worker is never invoked by an end user, only by the
//! agent's `MachineSupervisor::spawn` via an `Invoker` it builds
//! itself (spec §4.1). These flags are this port's own choice for
//! that `Invoker`'s argv, recorded here rather than left implicit.

use clap::Parser;
use std::path::PathBuf;

/// One `--port PROTOCOL_URL` flag; every declared port is opened
/// bidirectional/streaming (the only combination spec §8 scenario 6
/// exercises). A future port kind would need its own flag syntax.
#[derive(Debug, Parser)]
pub struct WorkerArgs {
    /// The agent's run directory — root-ca-bundle.pem and the
    /// machine's own handshake subdirectory live under here.
    #[arg(long)]
    pub run_dir: PathBuf,

    /// This machine's id, matching the subdirectory
    /// `<run_dir>/machines/<machine_id>` the agent created for the
    /// CSR/certificate handshake.
    #[arg(long)]
    pub machine_id: String,

    /// The machine's own URL (spec §3), as assigned by the agent.
    #[arg(long)]
    pub machine_url: String,

    /// Opaque program location handed to the (out-of-scope)
    /// interpreter/package loader.
    #[arg(long)]
    pub execution_uri: String,

    /// Caller-supplied configuration, JSON-encoded
    /// (`zuri_wire::ConfigMap::to_json_bytes`'s own format).
    #[arg(long, default_value = "{}")]
    pub config_json: String,

    /// One `ProtocolUrl` per declared port. May repeat.
    #[arg(long = "port")]
    pub ports: Vec<String>,

    /// Hold the runner at `Initial` until every declared port has
    /// attached (spec §4.3's init-complete barrier).
    #[arg(long)]
    pub start_suspended: bool,

    /// How long to wait for the agent to relay a signed certificate
    /// back after this process announces its CSR.
    #[arg(long, default_value_t = 10)]
    pub handshake_timeout_secs: u64,
}

impl WorkerArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
