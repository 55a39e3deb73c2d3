// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CSR generation for a single endpoint (spec §3: "per-machine-run, one
//! certificate per declared endpoint, minted by signing a CSR the
//! worker produces"). `zuri-security` only generates the CSR and its
//! matching private key here; signing it is the session CA's job
//! (`ca::SessionCa::sign_csr_pem`), performed agent-side.

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use zuri_core::Status;

fn to_status(err: rcgen::Error) -> Status {
    Status::agent_error(format!("CSR generation failed: {err}"))
}

/// A freshly generated endpoint keypair and its PEM-encoded CSR,
/// ready to be sent to the agent for signing.
pub struct EndpointCsr {
    pub csr_pem: String,
    pub private_key_pem: String,
}

impl EndpointCsr {
    pub fn generate(common_name: &str) -> Result<Self, Status> {
        let key_pair =
            KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).map_err(to_status)?;

        let mut params = CertificateParams::new(Vec::new()).map_err(to_status)?;
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;

        let csr = params.serialize_request(&key_pair).map_err(to_status)?;
        let csr_pem = csr.pem().map_err(to_status)?;

        Ok(Self { csr_pem, private_key_pem: key_pair.serialize_pem() })
    }
}

#[cfg(test)]
#[path = "csr_tests.rs"]
mod tests;
