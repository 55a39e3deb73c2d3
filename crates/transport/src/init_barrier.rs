// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `startSuspended` init-complete barrier (spec §4.3): a worker
//! configured this way has its runner constructed but does not
//! receive the initial `Resume` until every expected port URL has had
//! `Communicate` invoked against it, or an explicit `initComplete`
//! event satisfies the barrier directly.

use parking_lot::Mutex;
use std::collections::HashSet;

struct State {
    remaining: HashSet<String>,
    satisfied: bool,
}

/// Tracks which of a machine's declared ports have attached. Not used
/// at all when a worker does not start suspended — see
/// [`InitBarrier::always_satisfied`].
pub struct InitBarrier {
    state: Mutex<State>,
}

impl InitBarrier {
    /// A barrier that requires every url in `expected_ports` to attach
    /// before it reports satisfied.
    pub fn new(expected_ports: impl IntoIterator<Item = String>) -> Self {
        let remaining: HashSet<String> = expected_ports.into_iter().collect();
        let satisfied = remaining.is_empty();
        Self { state: Mutex::new(State { remaining, satisfied }) }
    }

    /// A barrier that is already satisfied — used when the worker was
    /// not configured with `startSuspended`, so there is nothing to
    /// wait for.
    pub fn always_satisfied() -> Self {
        Self { state: Mutex::new(State { remaining: HashSet::new(), satisfied: true }) }
    }

    pub fn is_satisfied(&self) -> bool {
        self.state.lock().satisfied
    }

    /// Call when `Communicate` attaches for `protocol_url`. Returns
    /// `true` exactly the first time this call makes the barrier
    /// satisfied.
    pub fn mark_attached(&self, protocol_url: &str) -> bool {
        let mut state = self.state.lock();
        if state.satisfied {
            return false;
        }
        state.remaining.remove(protocol_url);
        if state.remaining.is_empty() {
            state.satisfied = true;
            return true;
        }
        false
    }

    /// Call on an explicit `initComplete` event. Returns `true` if
    /// this call is what satisfied the barrier.
    pub fn mark_init_complete(&self) -> bool {
        let mut state = self.state.lock();
        if state.satisfied {
            return false;
        }
        state.satisfied = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_only_once_every_expected_port_attaches() {
        let barrier = InitBarrier::new(["a".to_string(), "b".to_string()]);
        assert!(!barrier.is_satisfied());
        assert!(!barrier.mark_attached("a"));
        assert!(!barrier.is_satisfied());
        assert!(barrier.mark_attached("b"));
        assert!(barrier.is_satisfied());
    }

    #[test]
    fn init_complete_satisfies_directly() {
        let barrier = InitBarrier::new(["a".to_string()]);
        assert!(barrier.mark_init_complete());
        assert!(barrier.is_satisfied());
        // A later attach is a no-op, not a second satisfaction.
        assert!(!barrier.mark_attached("a"));
    }

    #[test]
    fn empty_expected_set_starts_satisfied() {
        let barrier = InitBarrier::new(Vec::<String>::new());
        assert!(barrier.is_satisfied());
    }

    #[test]
    fn always_satisfied_never_requires_anything() {
        let barrier = InitBarrier::always_satisfied();
        assert!(barrier.is_satisfied());
        assert!(!barrier.mark_attached("anything"));
    }
}
