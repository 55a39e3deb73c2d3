// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-stream pending-write queue (spec §3, §4.5): `write(msg)`
//! enqueues a frame and, if no write is currently in flight, hands the
//! queue head to the transport; on completion the head is freed and,
//! if the queue is non-empty, the new head starts. Invariants: at most
//! one in-flight write per stream, strict FIFO, queue drained before
//! detach.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// The transport-facing half: actually pushes one frame onto the wire
/// (or, in tests, records it). `Communicate`'s server handler
/// implements this over the outbound gRPC stream's `mpsc::Sender`.
#[async_trait]
pub trait FrameWriter: Send + Sync + 'static {
    async fn write_frame(&self, frame: Vec<u8>) -> Result<(), ()>;
}

struct QueueState {
    pending: std::collections::VecDeque<Vec<u8>>,
    in_flight: bool,
    closed: bool,
}

/// Owns the FIFO of outbound frames awaiting `W`'s write-ready
/// callback equivalent. One instance per `Communicate` stream
/// direction.
pub struct PendingWriteQueue<W: FrameWriter> {
    writer: Arc<W>,
    state: Arc<Mutex<QueueState>>,
}

impl<W: FrameWriter> Clone for PendingWriteQueue<W> {
    fn clone(&self) -> Self {
        Self { writer: Arc::clone(&self.writer), state: Arc::clone(&self.state) }
    }
}

impl<W: FrameWriter> PendingWriteQueue<W> {
    pub fn new(writer: Arc<W>) -> Self {
        Self {
            writer,
            state: Arc::new(Mutex::new(QueueState {
                pending: std::collections::VecDeque::new(),
                in_flight: false,
                closed: false,
            })),
        }
    }

    /// Enqueues `frame`. If nothing is currently in flight, spawns the
    /// drain task that hands frames to `W` one at a time, FIFO, until
    /// the queue empties.
    pub fn write(&self, frame: Vec<u8>) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.pending.push_back(frame);
        if !state.in_flight {
            state.in_flight = true;
            drop(state);
            self.spawn_drain();
        }
    }

    fn spawn_drain(&self) {
        let writer = Arc::clone(&self.writer);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            loop {
                let frame = {
                    let mut guard = state.lock();
                    match guard.pending.pop_front() {
                        Some(frame) => frame,
                        None => {
                            guard.in_flight = false;
                            return;
                        }
                    }
                };
                if writer.write_frame(frame).await.is_err() {
                    let mut guard = state.lock();
                    guard.in_flight = false;
                    guard.pending.clear();
                    return;
                }
            }
        });
    }

    /// Stops accepting new frames. Frames already queued continue
    /// draining to completion; this only prevents new ones being
    /// accepted after the stream has been told to close.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

#[cfg(test)]
#[path = "pending_write_tests.rs"]
mod tests;
