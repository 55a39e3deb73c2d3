// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuri`'s command-line surface: a thin demo over `zuri-client`,
//! grounded on `chord_run`'s `create_session.cpp`/`run_package_command.cpp`
//! one-shot "spawn a session, run one package, wait, tear down" pattern
//! (SPEC_FULL.md's original_source supplement).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zuri_client::AgentListenTransport;

#[derive(Debug, Parser)]
#[command(name = "zuri")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Spawn (or reuse) an agent, run one machine to completion, and
    /// exit with its status code.
    Run(RunArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum ListenTransport {
    Unix,
    Tcp4,
}

impl From<ListenTransport> for AgentListenTransport {
    fn from(transport: ListenTransport) -> Self {
        match transport {
            ListenTransport::Unix => AgentListenTransport::Unix,
            ListenTransport::Tcp4 => AgentListenTransport::Tcp4,
        }
    }
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Name to register the machine under.
    #[arg(long)]
    pub name: String,

    /// The interpreter's execution URI, e.g. `dev.zuri.exec:my-package`.
    #[arg(long)]
    pub execution_uri: String,

    /// Repeatable `key=value` configuration entries passed through to
    /// the interpreter unexamined.
    #[arg(long = "config", value_parser = parse_key_val)]
    pub config: Vec<(String, String)>,

    #[arg(long)]
    pub start_suspended: bool,

    /// Path to the `zuria` agent binary, used when no running agent
    /// is reused.
    #[arg(long, default_value = "zuria")]
    pub agent_binary: PathBuf,

    /// An already-running agent's endpoint to try first
    /// (`dev.zuri.agent:name`-style URI the agent wrote to its run
    /// directory). Omit to always spawn a fresh agent.
    #[arg(long)]
    pub agent_endpoint: Option<String>,

    /// Required alongside `--agent-endpoint`: the session CA that
    /// signed that agent's certificate, so this client can keep
    /// minting certificates against the same trust root.
    #[arg(long, requires = "agent_endpoint")]
    pub ca_certificate: Option<PathBuf>,

    #[arg(long, requires = "agent_endpoint")]
    pub ca_private_key: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ListenTransport::Unix)]
    pub listen_transport: ListenTransport,

    #[arg(long, default_value_t = 10)]
    pub registration_timeout_secs: u64,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
