// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex as PLMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct RecordingWriter {
    received: Arc<PLMutex<Vec<Vec<u8>>>>,
    concurrent: Arc<AtomicUsize>,
    max_concurrent: Arc<AtomicUsize>,
}

#[async_trait]
impl FrameWriter for RecordingWriter {
    async fn write_frame(&self, frame: Vec<u8>) -> Result<(), ()> {
        let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.received.lock().push(frame);
        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn frames_are_written_in_fifo_order() {
    let received = Arc::new(PLMutex::new(Vec::new()));
    let writer = Arc::new(RecordingWriter {
        received: received.clone(),
        concurrent: Arc::new(AtomicUsize::new(0)),
        max_concurrent: Arc::new(AtomicUsize::new(0)),
    });
    let queue = PendingWriteQueue::new(writer);

    queue.write(b"m1".to_vec());
    queue.write(b"m2".to_vec());
    queue.write(b"m3".to_vec());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*received.lock(), vec![b"m1".to_vec(), b"m2".to_vec(), b"m3".to_vec()]);
}

#[tokio::test]
async fn at_most_one_write_in_flight() {
    let received = Arc::new(PLMutex::new(Vec::new()));
    let max_concurrent = Arc::new(AtomicUsize::new(0));
    let writer = Arc::new(RecordingWriter {
        received: received.clone(),
        concurrent: Arc::new(AtomicUsize::new(0)),
        max_concurrent: max_concurrent.clone(),
    });
    let queue = PendingWriteQueue::new(writer);

    for i in 0..10 {
        queue.write(vec![i]);
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(received.lock().len(), 10);
    assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_stops_accepting_new_frames_but_drains_queued_ones() {
    let received = Arc::new(PLMutex::new(Vec::new()));
    let writer = Arc::new(RecordingWriter {
        received: received.clone(),
        concurrent: Arc::new(AtomicUsize::new(0)),
        max_concurrent: Arc::new(AtomicUsize::new(0)),
    });
    let queue = PendingWriteQueue::new(writer);

    queue.write(b"before-close".to_vec());
    queue.close();
    queue.write(b"after-close".to_vec());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*received.lock(), vec![b"before-close".to_vec()]);
}
