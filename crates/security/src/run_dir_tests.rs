// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn create_writes_sid_file_and_sets_owner_only_permissions() {
    let base = tempdir().unwrap();
    let run_dir = RunDirectory::create(base.path(), "ses-test123").unwrap();

    assert!(run_dir.root().is_dir());
    let sid_contents = fs::read_to_string(run_dir.sid_file()).unwrap();
    assert_eq!(sid_contents, "ses-test123");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let dir_mode = fs::metadata(run_dir.root()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
        let sid_mode = fs::metadata(run_dir.sid_file()).unwrap().permissions().mode() & 0o777;
        assert_eq!(sid_mode, 0o600);
    }
}

#[test]
fn write_secret_then_remove_tears_down_the_directory() {
    let base = tempdir().unwrap();
    let run_dir = RunDirectory::create(base.path(), "ses-test456").unwrap();
    run_dir.write_secret(&run_dir.agent_certificate_file(), "pretend-cert-pem").unwrap();
    assert!(run_dir.agent_certificate_file().exists());

    let root = run_dir.root().to_path_buf();
    run_dir.remove().unwrap();
    assert!(!root.exists());
}

#[test]
fn well_known_sessions_root_is_stable_and_user_scoped() {
    let a = well_known_sessions_root();
    let b = well_known_sessions_root();
    assert_eq!(a, b);
    assert!(a.to_string_lossy().contains(&format!("sessions-{}", nix::unistd::Uid::current())));
}

#[test]
fn agent_endpoint_file_is_under_the_session_root() {
    let base = tempdir().unwrap();
    let run_dir = RunDirectory::create(base.path(), "ses-endpoint").unwrap();
    assert!(run_dir.agent_endpoint_file().starts_with(run_dir.root()));
}

#[test]
fn attach_reuses_a_directory_another_process_created() {
    let base = tempdir().unwrap();
    let created = RunDirectory::create(base.path(), "ses-attach").unwrap();
    let root = created.root().to_path_buf();
    let attached = RunDirectory::attach(root.clone());
    assert_eq!(attached.root(), root);
    assert_eq!(attached.sid_file(), created.sid_file());
}

#[test]
fn create_machine_dir_is_reachable_independently_via_the_free_function() {
    let base = tempdir().unwrap();
    let run_dir = RunDirectory::create(base.path(), "ses-machine").unwrap();
    let created = run_dir.create_machine_dir("mch-abc123").unwrap();
    assert!(created.is_dir());
    assert_eq!(created, machine_handshake_dir(run_dir.root(), "mch-abc123"));
    assert_eq!(run_dir.control_csr_file("mch-abc123"), created.join("control.csr.json"));
}

#[test]
fn paths_are_all_under_the_session_root() {
    let base = tempdir().unwrap();
    let run_dir = RunDirectory::create(base.path(), "ses-test789").unwrap();
    for path in [
        run_dir.ca_certificate_file(),
        run_dir.ca_private_key_file(),
        run_dir.agent_certificate_file(),
        run_dir.agent_private_key_file(),
        run_dir.agent_socket_file(),
        run_dir.root_ca_bundle_file(),
    ] {
        assert!(path.starts_with(run_dir.root()));
    }
}
