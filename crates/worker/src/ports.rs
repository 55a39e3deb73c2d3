// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns `zuriw`'s repeated `--port` flags into the `ProtocolUrl` set
//! `zuri_transport::PortRegistry` is built from. Every declared port
//! is bidirectional/streaming — the only port shape spec §8's
//! end-to-end scenarios exercise (scenario 5's `dev.zuri.proto:null`,
//! scenario 6's single `BiDirectional`/`Streaming` request).

use zuri_core::{ProtocolUrl, Status};

pub fn parse_ports(raw: &[String]) -> Result<Vec<ProtocolUrl>, Status> {
    raw.iter().map(|url| ProtocolUrl::parse(url.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_declared_port() {
        let urls = parse_ports(&["dev.zuri.proto:a".to_string(), "dev.zuri.proto:b".to_string()]).unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn rejects_a_malformed_port_url() {
        assert!(parse_ports(&["not-a-url".to_string()]).is_err());
    }

    #[test]
    fn empty_list_is_fine() {
        assert!(parse_ports(&[]).unwrap().is_empty());
    }
}
