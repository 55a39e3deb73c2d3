// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps a machine's URL to the worker's own id (its handshake
//! subdirectory name under the run directory), bridging
//! `CreateMachine`'s response to the later `RunMachine` call that
//! relays its signed certificate back (spec §4.6).

use parking_lot::Mutex;
use std::collections::HashMap;
use zuri_core::MachineUrl;

#[derive(Default)]
pub struct MachineRegistry {
    machines: Mutex<HashMap<MachineUrl, String>>,
}

impl MachineRegistry {
    pub fn insert(&self, url: MachineUrl, machine_id: String) {
        self.machines.lock().insert(url, machine_id);
    }

    pub fn get(&self, url: &MachineUrl) -> Option<String> {
        self.machines.lock().get(url).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_machine_id() {
        let registry = MachineRegistry::default();
        let url = MachineUrl::parse("dev.zuri.machine:abc").unwrap();
        registry.insert(url.clone(), "abc".to_string());
        assert_eq!(registry.get(&url), Some("abc".to_string()));
    }

    #[test]
    fn unknown_machine_misses() {
        let registry = MachineRegistry::default();
        let url = MachineUrl::parse("dev.zuri.machine:missing").unwrap();
        assert_eq!(registry.get(&url), None);
    }
}
