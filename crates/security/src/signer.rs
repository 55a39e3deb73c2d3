// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Grounded on `chord_common::AbstractCertificateSigner` /
//! `chord_sandbox::LocalCertificateSigner`
//! (`original_source/lib/chord_sandbox/include/chord_sandbox/local_certificate_signer.h`):
//! a narrow signing interface distinguishing "sign a session identity"
//! from "sign an endpoint identity", backed here by the one local
//! session CA rather than a remote signing service.

use crate::ca::SessionCa;
use std::time::Duration;
use zuri_core::Status;

/// Signs CSRs into certificates. The original source distinguishes
/// `signSession`/`signEndpoint` so a future signer could apply
/// different policy to each; `LocalCertificateSigner` treats both the
/// same way (one CA, caller-supplied validity) since this port has no
/// policy to differentiate them by.
pub trait CertificateSigner: Send + Sync {
    fn sign_session(&self, csr_pem: &str, validity: Duration) -> Result<String, Status>;
    fn sign_endpoint(&self, csr_pem: &str, validity: Duration) -> Result<String, Status>;
}

/// Signs every CSR against the in-process session CA.
pub struct LocalCertificateSigner {
    ca: SessionCa,
}

impl LocalCertificateSigner {
    pub fn new(ca: SessionCa) -> Self {
        Self { ca }
    }
}

impl CertificateSigner for LocalCertificateSigner {
    fn sign_session(&self, csr_pem: &str, validity: Duration) -> Result<String, Status> {
        self.ca.sign_csr_pem(csr_pem, validity)
    }

    fn sign_endpoint(&self, csr_pem: &str, validity: Duration) -> Result<String, Status> {
        self.ca.sign_csr_pem(csr_pem, validity)
    }
}

#[cfg(test)]
#[path = "signer_tests.rs"]
mod tests;
