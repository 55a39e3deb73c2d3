// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local, pre-TLS handoff between an agent and the worker it just
//! forked (spec §4.6's two-phase `CreateMachine`/`RunMachine`
//! handshake). A worker generates its own endpoint keypair and never
//! lets the private half leave the process; it writes only the CSR to
//! `CsrAnnouncement`'s file for its parent agent to relay to the
//! isolate client, and later reads the client's signed certificate
//! back from `RunSignal`'s file once the agent has relayed it down.
//! Both files live in the machine's own subdirectory of the agent's
//! run directory (owner-only, spec §6), so a local file is as safe a
//! bootstrap channel as a unix-domain socket would be — and needs no
//! listener of its own before the worker has a certificate to serve
//! RPC with.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

fn to_status(action: &str, path: &Path, err: impl std::fmt::Display) -> zuri_core::Status {
    zuri_core::Status::agent_error(format!("failed to {action} {}: {err}", path.display()))
}

/// Written by the worker once at startup: its endpoint URI and the
/// PEM-encoded CSR for the keypair it generated and is keeping to
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrAnnouncement {
    pub endpoint_uri: String,
    pub csr_pem: String,
}

/// Written once by the agent after the isolate client has signed the
/// worker's CSR and sent the certificate back via `RunMachine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSignal {
    pub certificate_pem: String,
    pub server_name: Option<String>,
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), zuri_core::Status> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(|err| to_status("write", &tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| to_status("rename", path, err))
}

impl CsrAnnouncement {
    pub fn write(&self, path: &Path) -> Result<(), zuri_core::Status> {
        let bytes = serde_json::to_vec(self).map_err(|err| to_status("serialize", path, err))?;
        write_atomic(path, &bytes)
    }

    /// Polls `path` until it appears or `timeout` elapses.
    pub fn read_with_timeout(path: &Path, timeout: Duration, poll: Duration) -> Result<Self, zuri_core::Status> {
        read_json_with_timeout(path, timeout, poll)
    }
}

impl RunSignal {
    pub fn write(&self, path: &Path) -> Result<(), zuri_core::Status> {
        let bytes = serde_json::to_vec(self).map_err(|err| to_status("serialize", path, err))?;
        write_atomic(path, &bytes)
    }

    pub fn read_with_timeout(path: &Path, timeout: Duration, poll: Duration) -> Result<Self, zuri_core::Status> {
        read_json_with_timeout(path, timeout, poll)
    }
}

fn read_json_with_timeout<T: for<'de> Deserialize<'de>>(
    path: &Path,
    timeout: Duration,
    poll: Duration,
) -> Result<T, zuri_core::Status> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(bytes) = fs::read(path) {
            return serde_json::from_slice(&bytes).map_err(|err| to_status("parse", path, err));
        }
        if Instant::now() >= deadline {
            return Err(zuri_core::Status::agent_unreachable(format!(
                "timed out waiting for {}",
                path.display()
            )));
        }
        std::thread::sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn csr_announcement_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("handshake.json");
        let announcement = CsrAnnouncement { endpoint_uri: "dev.zuri.endpoint:1".into(), csr_pem: "pem".into() };
        announcement.write(&path).unwrap();
        let read = CsrAnnouncement::read_with_timeout(&path, Duration::from_millis(100), Duration::from_millis(5)).unwrap();
        assert_eq!(read.endpoint_uri, announcement.endpoint_uri);
        assert_eq!(read.csr_pem, announcement.csr_pem);
    }

    #[test]
    fn read_with_timeout_fails_cleanly_when_file_never_appears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.json");
        let err = RunSignal::read_with_timeout(&path, Duration::from_millis(30), Duration::from_millis(5)).unwrap_err();
        assert_eq!(err.namespace, zuri_core::StatusNamespace::AgentUnreachable);
    }
}
