// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's set of [`PortSocket`]s, one per protocol URL the
//! machine declared when it was created (spec §4.3, §4.4).

use std::collections::HashMap;
use std::sync::Arc;
use zuri_core::ProtocolUrl;
use zuri_runner::PortSocket;

/// Looks up the `PortSocket` a `Communicate` call should attach to,
/// keyed by protocol URL.
#[derive(Default)]
pub struct PortRegistry {
    sockets: HashMap<String, Arc<PortSocket>>,
}

impl PortRegistry {
    pub fn new(protocol_urls: impl IntoIterator<Item = ProtocolUrl>) -> Self {
        let sockets = protocol_urls
            .into_iter()
            .map(|url| (url.as_str().to_string(), Arc::new(PortSocket::new())))
            .collect();
        Self { sockets }
    }

    pub fn get(&self, protocol_url: &str) -> Option<Arc<PortSocket>> {
        self.sockets.get(protocol_url).cloned()
    }

    pub fn protocol_urls(&self) -> impl Iterator<Item = &str> {
        self.sockets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_registered_sockets_and_misses_unregistered_ones() {
        let url = ProtocolUrl::parse("dev.zuri.proto:null").unwrap();
        let registry = PortRegistry::new([url.clone()]);
        assert!(registry.get(url.as_str()).is_some());
        assert!(registry.get("dev.zuri.proto:other").is_none());
    }
}
