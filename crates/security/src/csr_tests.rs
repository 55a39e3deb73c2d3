// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn generates_a_csr_and_matching_private_key() {
    let endpoint = EndpointCsr::generate("dev.zuri.endpoint:test").unwrap();
    assert!(endpoint.csr_pem.contains("BEGIN CERTIFICATE REQUEST"));
    assert!(!endpoint.private_key_pem.is_empty());
}

#[test]
fn two_calls_produce_distinct_keys() {
    let a = EndpointCsr::generate("dev.zuri.endpoint:a").unwrap();
    let b = EndpointCsr::generate("dev.zuri.endpoint:b").unwrap();
    assert_ne!(a.private_key_pem, b.private_key_pem);
}
