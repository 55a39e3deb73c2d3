// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges an interpreter's in-process duplex port to a `Communicate`
//! stream (spec §4.4). Messages are opaque byte sequences; this socket
//! performs no framing beyond what the caller hands it.

use parking_lot::Mutex;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PortSocketError {
    #[error("port already has an attached writer")]
    AlreadyAttached,
    #[error("port has no attached writer")]
    NotAttached,
}

/// The writer half a `Communicate` stream adapter hands to a
/// [`PortSocket`] on attach. Outbound frames flow through this.
pub trait PortWriter: Send {
    fn write(&self, message: Vec<u8>);
}

struct State {
    writer: Option<Box<dyn PortWriter>>,
    inbound: VecDeque<Vec<u8>>,
}

/// One named port's bridge between the interpreter's duplex queue and
/// a single attached stream writer.
pub struct PortSocket {
    state: Mutex<State>,
}

impl PortSocket {
    pub fn new() -> Self {
        Self { state: Mutex::new(State { writer: None, inbound: VecDeque::new() }) }
    }

    /// Binds a stream's writer to this port. Fails if an attach is
    /// already live; exactly one `Communicate` stream may own a port
    /// at a time (spec §4.3).
    pub fn attach(&self, writer: Box<dyn PortWriter>) -> Result<(), PortSocketError> {
        let mut state = self.state.lock();
        if state.writer.is_some() {
            return Err(PortSocketError::AlreadyAttached);
        }
        state.writer = Some(writer);
        Ok(())
    }

    /// Called for each frame received on the attached stream.
    pub fn handle(&self, message: Vec<u8>) {
        self.state.lock().inbound.push_back(message);
    }

    /// Called by the port's upper half (the interpreter side) to write
    /// a message out through the attached stream.
    pub fn send(&self, message: Vec<u8>) -> Result<(), PortSocketError> {
        let state = self.state.lock();
        match &state.writer {
            Some(writer) => {
                writer.write(message);
                Ok(())
            }
            None => Err(PortSocketError::NotAttached),
        }
    }

    /// Called on stream close: clears the writer and returns the port
    /// to idle so a later `Communicate` call may re-attach.
    pub fn detach(&self) {
        self.state.lock().writer = None;
    }

    /// Non-blocking pop of the next inbound frame, for the interpreter
    /// side to drain.
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.state.lock().inbound.pop_front()
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().writer.is_some()
    }
}

impl Default for PortSocket {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "port_socket_tests.rs"]
mod tests;
