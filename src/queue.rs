//! Retry queue shared by the seeding path and the merge loop
//!
//! A bounded channel holding at most one pending pull request URL. Pushing
//! waits for the slot to free up; popping waits for an item. Items are
//! delivered in push order and never dropped.

use crate::error::{Error, Result};
use tokio::sync::mpsc;

/// Number of items that may wait in the queue without blocking a producer
pub const QUEUE_CAPACITY: usize = 1;

/// Create a retry queue, returning its producer and consumer halves
pub fn retry_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer half; cheap to clone
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::Sender<String>,
}

impl QueueSender {
    /// Enqueue a pull request URL, waiting while the slot is occupied
    pub async fn push(&self, item: impl Into<String>) -> Result<()> {
        self.tx
            .send(item.into())
            .await
            .map_err(|_| Error::QueueClosed)
    }
}

/// Consumer half; owned by the single merge loop
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<String>,
}

impl QueueReceiver {
    /// Wait for the next item. Returns `None` once every sender is gone
    /// and the queue is empty.
    pub async fn pop(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
