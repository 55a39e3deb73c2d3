// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuria` entry point: parses its argv (spec §6), installs structured
//! logging, optionally daemonizes, and serves `InvokeService` until
//! shut down.

use zuri_agent::AgentArgs;

fn maybe_suspend_on_startup() {
    if std::env::var("SUSPEND_ON_STARTUP").as_deref() == Ok("1") {
        let _ = nix::sys::signal::raise(nix::sys::signal::Signal::SIGSTOP);
    }
}

/// Detaches from the spawning terminal (spec §6's `--background`).
/// A true double-fork would need `fork()`/`pre_exec()`, both `unsafe`
/// in nix's own API and therefore unavailable under this workspace's
/// `unsafe_code = "forbid"` lint; instead this re-execs itself once
/// with stdio redirected to `/dev/null` and a marker env var to stop
/// the re-exec from recursing, then the original process exits so the
/// isolate client's spawn call returns immediately.
const BACKGROUND_CHILD_MARKER: &str = "ZURIA_BACKGROUND_CHILD";

fn daemonize() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var(BACKGROUND_CHILD_MARKER).is_ok() {
        return Ok(());
    }

    let exe = std::env::current_exe()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::Command::new(exe)
        .args(args)
        .env(BACKGROUND_CHILD_MARKER, "1")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;
    std::process::exit(0);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = AgentArgs::parse_args();
    maybe_suspend_on_startup();

    if args.background {
        daemonize()?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        if let Err(status) = zuri_agent::run(args).await {
            tracing::error!(%status, "agent exited with an error");
            std::process::exit(1);
        }
    });
    Ok(())
}
