// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CreateMachineRequest.config_json`'s payload: an opaque
//! string-keyed configuration map the agent passes through to the
//! interpreter unexamined (spec §6, §8 scenario 6: "parsing the
//! config_hash reconstructs the original map").

use std::collections::BTreeMap;
use zuri_core::Status;

/// A caller-supplied configuration map. Kept as `BTreeMap` rather than
/// `HashMap` so its JSON serialization is key-ordered and therefore
/// deterministic across processes — useful for logging and for the
/// round-trip test in spec §8 scenario 6.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfigMap(BTreeMap<String, String>);

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to the bytes that go into `CreateMachineRequest.config_json`.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        // A `BTreeMap<String, String>` always serializes; this cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Parse the bytes read back out of `CreateMachineRequest.config_json`.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, Status> {
        serde_json::from_slice(bytes)
            .map_err(|err| Status::invalid_configuration(format!("malformed config map: {err}")))
    }
}

impl FromIterator<(String, String)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json_bytes() {
        let mut config = ConfigMap::new();
        config.insert("foo", "bar");
        config.insert("baz", "quux");

        let bytes = config.to_json_bytes();
        let parsed = ConfigMap::from_json_bytes(&bytes).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.get("foo"), Some("bar"));
    }

    #[test]
    fn rejects_malformed_bytes() {
        assert!(ConfigMap::from_json_bytes(b"not json").is_err());
    }

    #[test]
    fn empty_map_round_trips() {
        let config = ConfigMap::new();
        let bytes = config.to_json_bytes();
        assert_eq!(ConfigMap::from_json_bytes(&bytes).unwrap(), config);
    }
}
