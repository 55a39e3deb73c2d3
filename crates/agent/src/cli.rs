// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuria`'s command-line surface — verbatim from spec §6: "invoked by
//! the isolate, not by end users."

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum ListenTransport {
    Unix,
    Tcp4,
}

#[derive(Debug, Parser)]
#[command(name = "zuria")]
pub struct AgentArgs {
    #[arg(long)]
    pub agent_name: String,

    #[arg(long, value_enum)]
    pub listen_transport: ListenTransport,

    /// Detach from the spawning terminal before serving RPC. Set by
    /// the isolate client's `AlwaysSpawn` discovery policy; harmless
    /// (and commonly omitted) when an operator runs `zuria` by hand.
    #[arg(long)]
    pub background: bool,

    #[arg(long)]
    pub certificate: PathBuf,

    #[arg(long)]
    pub private_key: PathBuf,

    #[arg(long)]
    pub ca_bundle: PathBuf,

    /// Shut down once no machine has been active for this long. No
    /// timeout by default — the agent runs until terminated.
    #[arg(long)]
    pub idle_timeout: Option<u64>,

    /// Remove the run directory on a clean `shutdown()` rather than
    /// leaving it for the next session to reuse or inspect.
    #[arg(long)]
    pub temporary_session: bool,
}

impl AgentArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
