//! Bounded fan-out queue connecting the write path to the read pool

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// A bounded multi-consumer FIFO of work items.
///
/// `push` suspends the producer while the queue is full, so backpressure
/// propagates to the write rate instead of memory growing without bound.
/// `try_pop` never suspends; consumers handle an empty queue by sleeping a
/// short poll interval and re-checking their deadline, which keeps exit
/// latency bounded once the queue stays empty past the deadline.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    // One permit per free slot; push consumes, try_pop returns.
    slots: Semaphore,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    /// Default queue capacity.
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Create a queue with the given capacity. Capacity must be non-zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self {
            items: Mutex::new(VecDeque::new()),
            slots: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Append an item, waiting for a free slot if the queue is full.
    pub async fn push(&self, item: T) {
        let permit = match self.slots.acquire().await {
            Ok(permit) => permit,
            // acquire only fails on a closed semaphore; WorkQueue never
            // closes its own.
            Err(_) => return,
        };
        permit.forget();
        self.items.lock().push_back(item);
    }

    /// Remove and return the oldest item, or `None` without waiting if the
    /// queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.items.lock().pop_front();
        if item.is_some() {
            self.slots.add_permits(1);
        }
        item
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new(10);
        queue.push(1u32).await;
        queue.push(2).await;
        queue.push(3).await;

        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
    }

    #[tokio::test]
    async fn test_try_pop_empty_returns_none() {
        let queue: WorkQueue<u32> = WorkQueue::new(4);
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_push_blocks_when_full() {
        let queue = Arc::new(WorkQueue::new(2));
        queue.push(1u32).await;
        queue.push(2).await;
        assert_eq!(queue.len(), 2);

        // Third push must not complete while the queue is at capacity.
        let blocked = tokio::time::timeout(Duration::from_millis(50), queue.push(3)).await;
        assert!(blocked.is_err());
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_pop_releases_capacity() {
        let queue = Arc::new(WorkQueue::new(1));
        queue.push(1u32).await;

        let q = Arc::clone(&queue);
        let pending = tokio::spawn(async move { q.push(2).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.try_pop(), Some(1));

        tokio::time::timeout(Duration::from_millis(100), pending)
            .await
            .expect("push should resume after a slot frees up")
            .expect("push task should not panic");
        assert_eq!(queue.try_pop(), Some(2));
    }

    #[tokio::test]
    async fn test_len_never_exceeds_capacity_under_pressure() {
        let queue = Arc::new(WorkQueue::new(8));

        let producer = {
            let q = Arc::clone(&queue);
            tokio::spawn(async move {
                for i in 0..256u32 {
                    q.push(i).await;
                }
            })
        };

        let consumer = {
            let q = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut seen = 0;
                while seen < 256 {
                    assert!(q.len() <= q.capacity());
                    if q.try_pop().is_some() {
                        seen += 1;
                    } else {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                    }
                }
                seen
            })
        };

        producer.await.unwrap();
        assert_eq!(consumer.await.unwrap(), 256);
        assert!(queue.is_empty());
    }
}
