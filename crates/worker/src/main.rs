// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zuriw` entry point: parses its argv (spec §4.1's `Invoker`, this
//! port's own flag surface — see `cli.rs`), installs structured
//! logging, and serves one machine's `RemotingService` until the
//! runner reaches a terminal state.

use zuri_worker::WorkerArgs;

fn maybe_suspend_on_startup() {
    if std::env::var("SUSPEND_ON_STARTUP").as_deref() == Ok("1") {
        // spec §6: "raise SIGSTOP on itself immediately after argument
        // parsing, to allow a debugger to attach."
        let _ = nix::sys::signal::raise(nix::sys::signal::Signal::SIGSTOP);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = WorkerArgs::parse_args();
    maybe_suspend_on_startup();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        if let Err(status) = zuri_worker::run(args).await {
            tracing::error!(%status, "worker exited with an error");
            std::process::exit(1);
        }
    });
    Ok(())
}
