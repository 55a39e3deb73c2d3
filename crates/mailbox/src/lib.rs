// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! `CommandMailbox<T>`: an ordered, cross-thread wakeable FIFO with
//! exactly one consumer and any number of producers (spec §3, §4.2).
//!
//! Grounded on the original `BaseAsyncQueue` (a `std::queue` guarded by
//! a mutex, woken via a libuv async handle): here the wakeup primitive
//! is a [`std::sync::Condvar`] rather than an event-loop handle, since
//! the sole consumer — the runner thread — blocks synchronously instead
//! of running a loop of its own (spec §5).
//!
//! REDESIGN FLAGS (spec §9): generic over the message type so the same
//! mailbox type serves both the command side (`Mailbox<Command>`) and
//! the reply side (`Mailbox<Reply>`).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

struct State<T> {
    queue: VecDeque<T>,
    initialized: bool,
    closed: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

/// The producer/consumer-shared mailbox handle. Clone freely; every
/// clone refers to the same underlying queue.
pub struct Mailbox<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State { queue: VecDeque::new(), initialized: false, closed: false }),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Marks the mailbox ready to be waited on. Idempotent-safe to call
    /// once; any messages sent before this call are still delivered —
    /// they were already queued — this simply wakes a consumer that
    /// might already be parked in [`Mailbox::wait_for_message`].
    #[allow(clippy::unwrap_used)]
    pub fn initialize(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.initialized = true;
        if !state.queue.is_empty() {
            self.inner.condvar.notify_all();
        }
    }

    /// Send a message. Safe from any thread. Never blocks.
    #[allow(clippy::unwrap_used)]
    pub fn send(&self, message: T) {
        let mut state = self.inner.state.lock().unwrap();
        if state.closed {
            tracing::warn!("dropping message sent to a closed mailbox");
            return;
        }
        state.queue.push_back(message);
        self.inner.condvar.notify_all();
    }

    /// Pull-mode consumer: block until exactly one message is available,
    /// then return it. Returns `None` only once the mailbox has been
    /// closed with no message pending.
    #[allow(clippy::unwrap_used)]
    pub fn wait_for_message(&self) -> Option<T> {
        let mut state = self.inner.state.lock().unwrap();
        loop {
            if let Some(message) = state.queue.pop_front() {
                return Some(message);
            }
            if state.closed {
                return None;
            }
            state = self.inner.condvar.wait(state).unwrap();
        }
    }

    /// Like [`Mailbox::wait_for_message`] but gives up after `timeout`
    /// with no message delivered, returning `None` without closing the
    /// mailbox. Used by tests exercising the wakeup property (spec §8)
    /// without risking an indefinite hang on failure.
    #[allow(clippy::unwrap_used)]
    pub fn wait_for_message_timeout(&self, timeout: Duration) -> Option<T> {
        let mut state = self.inner.state.lock().unwrap();
        loop {
            if let Some(message) = state.queue.pop_front() {
                return Some(message);
            }
            if state.closed {
                return None;
            }
            let (guard, result) = self.inner.condvar.wait_timeout(state, timeout).unwrap();
            state = guard;
            if result.timed_out() && state.queue.is_empty() {
                return None;
            }
        }
    }

    /// Pump-mode consumer: invoke `on_message` for every message until
    /// either `on_message` returns [`Pump::Stop`] or [`Mailbox::close`]
    /// is called from another thread.
    pub fn pump(&self, mut on_message: impl FnMut(T) -> Pump) {
        loop {
            let Some(message) = self.wait_for_message() else { return };
            if on_message(message) == Pump::Stop {
                return;
            }
        }
    }

    /// Take a message only if one is already queued, without blocking.
    #[allow(clippy::unwrap_used)]
    pub fn try_take(&self) -> Option<T> {
        let mut state = self.inner.state.lock().unwrap();
        state.queue.pop_front()
    }

    /// Close the mailbox: wakes any parked consumer, causing
    /// `wait_for_message` to return `None`, and future `send`s to be
    /// dropped with a logged warning.
    #[allow(clippy::unwrap_used)]
    pub fn close(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.closed = true;
        self.inner.condvar.notify_all();
    }
}

impl<T> Drop for Inner<T> {
    #[allow(clippy::unwrap_used)]
    fn drop(&mut self) {
        let state = self.state.lock().unwrap();
        for _ in &state.queue {
            tracing::warn!("dropping undelivered mailbox message");
        }
    }
}

/// Result of a [`Mailbox::pump`] callback: continue the loop or stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    Continue,
    Stop,
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
