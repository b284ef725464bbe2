//! Unbounded, cancellable, multi-consumer FIFO queue.
//!
//! Mirrors the guarded-linked-list-plus-notifier design from the queue this
//! was translated from: a single mutex guards the backing deque, and a
//! [`tokio::sync::Notify`] wakes exactly one waiting consumer per `enqueue`.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// Thread-safe FIFO queue. Safe to share behind an `Arc` across producers
/// and consumers.
pub struct Fifo<T> {
    items: Mutex<VecDeque<T>>,
    notify: tokio::sync::Notify,
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Fifo {
            items: Mutex::new(VecDeque::new()),
            notify: tokio::sync::Notify::new(),
        }
    }
}

/// Returned by [`Fifo::dequeue`] when the supplied token is cancelled before
/// an item becomes available.
#[derive(Debug, thiserror::Error)]
#[error("queue operation cancelled")]
pub struct Cancelled;

impl<T> Fifo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the back of the queue. Only fails if `token` is
    /// already cancelled.
    pub async fn enqueue(&self, token: &CancellationToken, value: T) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            return Err(Cancelled);
        }
        self.items.lock().unwrap().push_back(value);
        self.notify.notify_one();
        Ok(())
    }

    /// Blocks until an item is available or `token` is cancelled.
    pub async fn dequeue(&self, token: &CancellationToken) -> Result<T, Cancelled> {
        loop {
            if let Some(value) = self.items.lock().unwrap().pop_front() {
                // Another waiter may still be parked on a stale permit; if
                // there's more work left, pass the signal along.
                if !self.items.lock().unwrap().is_empty() {
                    self.notify.notify_one();
                }
                return Ok(value);
            }

            tokio::select! {
                _ = token.cancelled() => return Err(Cancelled),
                _ = self.notify.notified() => {}
            }
        }
    }

    /// Current depth of the queue.
    pub fn size(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn fifo_order_preserved_under_concurrent_consumers() {
        let fifo = Arc::new(Fifo::<i32>::new());
        let token = CancellationToken::new();

        for i in 0..10 {
            fifo.enqueue(&token, i).await.unwrap();
        }
        assert_eq!(fifo.size(), 10);

        let mut seen = Vec::new();
        for _ in 0..10 {
            seen.push(fifo.dequeue(&token).await.unwrap());
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(fifo.size(), 0);
    }

    #[tokio::test]
    async fn dequeue_cancels_without_consuming() {
        let fifo = Fifo::<i32>::new();
        let token = CancellationToken::new();
        token.cancel();

        let err = fifo.dequeue(&token).await;
        assert!(err.is_err());
        assert_eq!(fifo.size(), 0);
    }

    #[tokio::test]
    async fn dequeue_wakes_on_enqueue() {
        let fifo = Arc::new(Fifo::<i32>::new());
        let token = CancellationToken::new();

        let fifo2 = fifo.clone();
        let token2 = token.clone();
        let handle = tokio::spawn(async move { fifo2.dequeue(&token2).await });

        tokio::task::yield_now().await;
        fifo.enqueue(&token, 42).await.unwrap();

        let value = handle.await.unwrap().unwrap();
        assert_eq!(value, 42);
    }
}
