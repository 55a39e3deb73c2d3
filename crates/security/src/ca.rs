// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ephemeral session CA (spec §3): one self-signed ECDSA P-256
//! certificate authority minted at session start, used to sign the
//! agent's own certificate and every endpoint certificate for the
//! lifetime of the session.

use rcgen::{BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};
use std::time::Duration as StdDuration;
use time::{Duration, OffsetDateTime};
use zuri_core::Status;

fn to_status(err: rcgen::Error) -> Status {
    Status::agent_error(format!("certificate authority operation failed: {err}"))
}

/// A freshly minted, self-signed session certificate authority.
pub struct SessionCa {
    cert: Certificate,
    key_pair: KeyPair,
}

impl SessionCa {
    /// Generates a new ECDSA P-256 session CA valid for `validity`
    /// (spec §3: "ephemeral session CA"). There is no fixed default —
    /// callers pick a lifetime appropriate to the session.
    pub fn generate(common_name: &str, validity: StdDuration) -> Result<Self, Status> {
        let key_pair =
            KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).map_err(to_status)?;

        let mut params = CertificateParams::new(Vec::new()).map_err(to_status)?;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.distinguished_name = common_name_dn(common_name);
        let (not_before, not_after) = validity_window(validity);
        params.not_before = not_before;
        params.not_after = not_after;

        let cert = params.self_signed(&key_pair).map_err(to_status)?;
        Ok(Self { cert, key_pair })
    }

    /// Reloads a session CA from its own already-minted certificate and
    /// private key, so a second process can keep issuing certificates
    /// against a trust root it didn't itself generate (the isolate
    /// client's `UseSpecifiedEndpoint`/`SpawnIfMissing` discovery
    /// policies, spec §4.6: the agent is already running under a CA
    /// this client process never minted). Grounded on rcgen's own
    /// `CertificateParams::from_ca_cert_pem` reload path — the
    /// counterpart to `EndpointCsr`'s `CertificateSigningRequestParams::from_pem`.
    pub fn load(ca_certificate_pem: &str, ca_private_key_pem: &str) -> Result<Self, Status> {
        let key_pair = KeyPair::from_pem(ca_private_key_pem).map_err(to_status)?;
        let params = CertificateParams::from_ca_cert_pem(ca_certificate_pem).map_err(to_status)?;
        let cert = params.self_signed(&key_pair).map_err(to_status)?;
        Ok(Self { cert, key_pair })
    }

    /// Signs a CSR (PEM-encoded), producing a PEM-encoded leaf
    /// certificate. Used both for the agent's own certificate and for
    /// each machine endpoint's certificate (spec §3). Each certificate
    /// is short-lived — `validity` is always caller-supplied, never a
    /// crate-wide default, so a misconfigured caller can't mint an
    /// unbounded-lifetime certificate by omission.
    pub fn sign_csr_pem(&self, csr_pem: &str, validity: StdDuration) -> Result<String, Status> {
        let mut csr_params =
            rcgen::CertificateSigningRequestParams::from_pem(csr_pem).map_err(to_status)?;
        let (not_before, not_after) = validity_window(validity);
        csr_params.params.not_before = not_before;
        csr_params.params.not_after = not_after;
        let signed =
            csr_params.signed_by(&self.cert, &self.key_pair).map_err(to_status)?;
        Ok(signed.pem())
    }

    /// The CA's own certificate, PEM-encoded. Copied into the run
    /// directory as the shared root-CA bundle.
    pub fn ca_certificate_pem(&self) -> String {
        self.cert.pem()
    }

    /// The CA's private key, PEM-encoded. Never leaves the agent
    /// process's own run directory.
    pub fn ca_private_key_pem(&self) -> String {
        self.key_pair.serialize_pem()
    }
}

fn common_name_dn(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn
}

fn validity_window(validity: StdDuration) -> (OffsetDateTime, OffsetDateTime) {
    let not_before = OffsetDateTime::now_utc();
    let span = Duration::try_from(validity).unwrap_or(Duration::ZERO);
    (not_before, not_before + span)
}

#[cfg(test)]
#[path = "ca_tests.rs"]
mod tests;
