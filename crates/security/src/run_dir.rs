// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session run directory (spec §3, §6): owned by the current
//! user, mode 0700, holding the session id file, the shared root-CA
//! bundle, the agent's own certificate/key pair, and the agent's
//! listening unix-domain socket. Grounded on
//! `original_source/lib/chord_sandbox/include/chord_sandbox/internal/session_utils.h`'s
//! `PrepareSessionResult` (`sessionId`, `pemCertificateFile`,
//! `pemPrivateKeyFile`) and `LoadSessionResult`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zuri_core::Status;

#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o700;
#[cfg(unix)]
const SECRET_FILE_MODE: u32 = 0o600;

fn to_status(path: &Path, action: &str, err: io::Error) -> Status {
    Status::agent_error(format!("failed to {action} {}: {err}", path.display()))
}

/// The well-known per-user run-directory root (spec §9 "Process-wide
/// state": "Agent discovery writes the run directory into a well-known
/// path derived from the current user's uid"). Grounded on
/// `original_source/bin/chord_run/src/create_session.cpp`'s
/// `sessions-<uid>` directory naming; `dirs::cache_dir()` stands in for
/// the original's caller-supplied `runDirectory` root, since this port
/// has no prior config file to source one from. Both the isolate
/// client (when spawning under `AlwaysSpawn`) and the freshly spawned
/// agent derive this same path independently from `agent_name`, so
/// neither needs to pass the run directory or the listening socket
/// path to the other on the command line.
pub fn well_known_sessions_root() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    base.join("zuri").join(format!("sessions-{}", nix::unistd::Uid::current()))
}

/// `<run_dir>/machines/<machine_id>`: see [`RunDirectory::machine_dir`].
/// Free-standing so a worker process — which only ever sees the run
/// directory's path, never an open [`RunDirectory`] handle — can
/// compute the same path independently.
pub fn machine_handshake_dir(run_dir_root: &Path, machine_id: &str) -> PathBuf {
    run_dir_root.join("machines").join(machine_id)
}

/// A live, created run directory. `remove()` tears it down; if the
/// caller never calls it explicitly the directory is left on disk —
/// unlike the credential material inside it, an abandoned directory
/// is not a security hazard worth an automatic `Drop`.
pub struct RunDirectory {
    root: PathBuf,
}

impl RunDirectory {
    /// Creates `base_dir/<session_id>` with mode 0700. Fails if it
    /// already exists — session ids are unique per `zuri_core::id`.
    pub fn create(base_dir: &Path, session_id: &str) -> Result<Self, Status> {
        let root = base_dir.join(session_id);
        fs::create_dir_all(base_dir).map_err(|err| to_status(base_dir, "create", err))?;
        fs::create_dir(&root).map_err(|err| to_status(&root, "create", err))?;
        set_mode(&root, DIRECTORY_MODE)?;
        let sid_path = root.join("sid");
        fs::write(&sid_path, session_id).map_err(|err| to_status(&root, "write sid into", err))?;
        set_mode(&sid_path, SECRET_FILE_MODE)?;
        Ok(Self { root })
    }

    /// Attaches to a run directory another process already created
    /// (spec §4.6 `AlwaysSpawn`: the isolate client creates the run
    /// directory and writes the agent's own credentials into it
    /// *before* spawning `zuria` — the agent process itself only ever
    /// attaches to what's already there). Unlike [`RunDirectory::create`]
    /// this does not require the directory to not yet exist, nor does
    /// it create one if it's missing.
    pub fn attach(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sid_file(&self) -> PathBuf {
        self.root.join("sid")
    }

    pub fn ca_certificate_file(&self) -> PathBuf {
        self.root.join("ca.pem")
    }

    pub fn ca_private_key_file(&self) -> PathBuf {
        self.root.join("ca.key")
    }

    pub fn agent_certificate_file(&self) -> PathBuf {
        self.root.join("agent.pem")
    }

    pub fn agent_private_key_file(&self) -> PathBuf {
        self.root.join("agent.key")
    }

    pub fn agent_socket_file(&self) -> PathBuf {
        self.root.join("agent.sock")
    }

    pub fn root_ca_bundle_file(&self) -> PathBuf {
        self.root.join("root-ca-bundle.pem")
    }

    /// The per-machine handshake subdirectory, created by the agent
    /// before it spawns a worker (spec §4.6's `CreateMachine`): the
    /// worker announces its CSR here, and later reads its signed
    /// certificate back from the same directory once `RunMachine`
    /// relays it down. Shared path convention — the agent computes it
    /// with an already-open `RunDirectory`, the worker with only a
    /// `--run-dir` CLI flag and its own machine id, so it's also
    /// exposed as the free function [`machine_handshake_dir`].
    pub fn machine_dir(&self, machine_id: &str) -> PathBuf {
        machine_handshake_dir(&self.root, machine_id)
    }

    /// Where the worker announces its control endpoint's CSR
    /// (spec §4.6). One file per machine — this port's single-endpoint
    /// simplification (see DESIGN.md) means every requested port
    /// shares the control endpoint's identity, so there is no
    /// per-port CSR file to additionally track.
    pub fn control_csr_file(&self, machine_id: &str) -> PathBuf {
        self.machine_dir(machine_id).join("control.csr.json")
    }

    /// Where the agent relays the signed certificate back to the
    /// worker, once the isolate client has returned it via
    /// `RunMachine` (spec §4.6).
    pub fn control_run_file(&self, machine_id: &str) -> PathBuf {
        self.machine_dir(machine_id).join("control.run.json")
    }

    /// Creates `<run_dir>/machines/<machine_id>` with mode 0700, ready
    /// for the worker to write its `CsrAnnouncement` into.
    pub fn create_machine_dir(&self, machine_id: &str) -> Result<PathBuf, Status> {
        let dir = self.machine_dir(machine_id);
        fs::create_dir_all(&dir).map_err(|err| to_status(&dir, "create", err))?;
        set_mode(&dir, DIRECTORY_MODE)?;
        Ok(dir)
    }

    /// Where the agent writes its bound listening location after
    /// startup (`unix:<path>` or `tcp4:<host>:<port>`), and where the
    /// isolate client reads it back from once spawned. Supplements
    /// `agent.sock` (which only names a unix-domain path) so a
    /// `tcp4`-transport agent has a discovery mechanism too — grounded
    /// on `LoadSessionResult::endpoint` / `SpawnSessionResult::endpoint`
    /// in `original_source/lib/chord_sandbox/include/chord_sandbox/internal/session_utils.h`.
    pub fn agent_endpoint_file(&self) -> PathBuf {
        self.root.join("agent.endpoint")
    }

    /// Writes `contents` to `path` (expected to be one of this
    /// directory's own paths) with owner-only permissions.
    pub fn write_secret(&self, path: &Path, contents: &str) -> Result<(), Status> {
        fs::write(path, contents).map_err(|err| to_status(path, "write", err))?;
        set_mode(path, SECRET_FILE_MODE)
    }

    /// Removes the directory and everything in it. Called at session
    /// end (spec §3: "Lifecycle: created at session start, removed at
    /// session end").
    pub fn remove(self) -> Result<(), Status> {
        fs::remove_dir_all(&self.root).map_err(|err| to_status(&self.root, "remove", err))
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), Status> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path).map_err(|err| to_status(path, "stat", err))?.permissions();
    permissions.set_mode(mode);
    fs::set_permissions(path, permissions).map_err(|err| to_status(path, "chmod", err))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), Status> {
    Ok(())
}

#[cfg(test)]
#[path = "run_dir_tests.rs"]
mod tests;
