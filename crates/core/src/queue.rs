//! Single-flight write queue.
//!
//! Every mutation of the capture collection runs inside [`WriteQueue::run`].
//! The queue is a fair async mutex: waiters are served in the order they
//! arrived, and a task that fails (or panics) releases its turn so later
//! tasks still run.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct WriteQueue {
    turn: Mutex<()>,
    waiting: AtomicUsize,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks queued or running.
    pub fn pending(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Run `task` once every previously queued task has finished.
    pub async fn run<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let queued = self.waiting.fetch_add(1, Ordering::SeqCst);
        if queued > 0 {
            tracing::trace!(ahead = queued, "waiting for write turn");
        }
        let _guard = PendingGuard(&self.waiting);
        let _turn = self.turn.lock().await;
        task().await
    }
}

struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
