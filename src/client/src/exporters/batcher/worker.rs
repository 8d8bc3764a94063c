use super::backpressure::BackpressureReporter;
use super::queue::{Admission, BoundedQueue, QueuedEvent};
use telemetry_common::event::PartitionKey;
use tokio::sync::Notify;

/// Per-partition state: one queue, one flush signal, one drop reporter.
///
/// Producers call [`PartitionWorker::offer`]; the partition's flush loop is
/// the only consumer.
pub struct PartitionWorker {
    key: PartitionKey,
    queue: BoundedQueue,
    wakeup: Notify,
    reporter: BackpressureReporter,
    max_batch_size: usize,
}

impl PartitionWorker {
    pub fn new(key: PartitionKey, capacity: usize, max_batch_size: usize) -> Self {
        PartitionWorker {
            key,
            queue: BoundedQueue::new(capacity),
            wakeup: Notify::new(),
            reporter: BackpressureReporter::new(),
            max_batch_size,
        }
    }

    /// Non-blocking. Wakes the flush loop when the queue becomes non-empty
    /// (arming the timer) or reaches the batch size.
    pub fn offer(&self, item: QueuedEvent) -> Admission {
        let admission = self.queue.add(item);

        match admission {
            Admission::Accepted { len } => {
                if len == 1 || len >= self.max_batch_size {
                    self.wakeup.notify_one();
                }
            }
            Admission::Dropped { consecutive_drops } => {
                self.reporter.record_drop(&self.key, consecutive_drops);
            }
        }

        admission
    }

    pub(super) async fn woken(&self) {
        self.wakeup.notified().await
    }

    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn queue(&self) -> &BoundedQueue {
        &self.queue
    }

    pub fn reporter(&self) -> &BackpressureReporter {
        &self.reporter
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
