// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::csr::EndpointCsr;
use std::time::Duration;

#[test]
fn generates_a_self_signed_ca_certificate() {
    let ca = SessionCa::generate("zuri session ca", Duration::from_secs(3600)).unwrap();
    let pem = ca.ca_certificate_pem();
    assert!(pem.contains("BEGIN CERTIFICATE"));
    assert!(ca.ca_private_key_pem().contains("BEGIN PRIVATE KEY") || ca.ca_private_key_pem().contains("BEGIN EC PRIVATE KEY"));
}

#[test]
fn signs_an_endpoint_csr_into_a_leaf_certificate() {
    let ca = SessionCa::generate("zuri session ca", Duration::from_secs(3600)).unwrap();
    let endpoint = EndpointCsr::generate("dev.zuri.endpoint:test").unwrap();
    let leaf_pem = ca.sign_csr_pem(&endpoint.csr_pem, Duration::from_secs(300)).unwrap();
    assert!(leaf_pem.contains("BEGIN CERTIFICATE"));
}

#[test]
fn loaded_ca_can_keep_signing_csrs() {
    let original = SessionCa::generate("zuri session ca", Duration::from_secs(3600)).unwrap();
    let reloaded = SessionCa::load(&original.ca_certificate_pem(), &original.ca_private_key_pem()).unwrap();
    let endpoint = EndpointCsr::generate("dev.zuri.endpoint:test").unwrap();
    let leaf_pem = reloaded.sign_csr_pem(&endpoint.csr_pem, Duration::from_secs(300)).unwrap();
    assert!(leaf_pem.contains("BEGIN CERTIFICATE"));
}
