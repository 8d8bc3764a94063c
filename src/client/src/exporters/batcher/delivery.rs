use super::error::DeliveryError;
use super::queue::CompletionCallback;
use crate::exporters::batch_publisher::{BatchPublisher, PublishResponse};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry_common::batch::Batch;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub events_sent: u64,
    pub events_failed: u64,
    pub in_flight: usize,
}

#[derive(Default)]
struct Counters {
    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    events_sent: AtomicU64,
    events_failed: AtomicU64,
}

/// Admission control in front of the publisher.
///
/// At most `max_concurrent_sends` batches are in flight across all
/// partitions, and each one gets `send_timeout` regardless of who is waiting
/// on it, shutdown included.
pub struct DeliveryGate<P> {
    publisher: P,
    slots: Arc<Semaphore>,
    max_slots: usize,
    send_timeout: Duration,
    tracker: TaskTracker,
    counters: Counters,
}

impl<P: BatchPublisher> DeliveryGate<P> {
    pub fn new(
        publisher: P,
        max_concurrent_sends: usize,
        send_timeout: Duration,
        tracker: TaskTracker,
    ) -> Self {
        DeliveryGate {
            publisher,
            slots: Arc::new(Semaphore::new(max_concurrent_sends)),
            max_slots: max_concurrent_sends,
            send_timeout,
            tracker,
            counters: Counters::default(),
        }
    }

    /// Waits for a free slot, sends, releases the slot, then hands the
    /// outcome to `callbacks` on a separate task. Failures are logged and
    /// returned but never retried.
    pub async fn deliver(
        &self,
        batch: Batch,
        callbacks: Vec<CompletionCallback>,
    ) -> Result<PublishResponse, DeliveryError> {
        let outcome = self.send(&batch).await;

        match &outcome {
            Ok(response) => {
                self.counters.batches_sent.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .events_sent
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
                debug!(
                    partition = %batch.key(),
                    events = batch.len(),
                    accepted = response.accepted,
                    "published batch"
                );
            }
            Err(e) => {
                self.counters.batches_failed.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .events_failed
                    .fetch_add(batch.len() as u64, Ordering::Relaxed);
                warn!(
                    partition = %batch.key(),
                    events = batch.len(),
                    error = %e,
                    "failed to publish batch"
                );
            }
        }

        if !callbacks.is_empty() {
            let result = outcome.as_ref().map(|_| ()).map_err(Clone::clone);
            self.tracker.spawn(async move {
                for callback in callbacks {
                    callback(result.clone());
                }
            });
        }

        outcome
    }

    async fn send(&self, batch: &Batch) -> Result<PublishResponse, DeliveryError> {
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| DeliveryError::GateClosed)?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.send_timeout, self.publisher.publish_batch(batch))
            .await
            .map_err(|_| DeliveryError::Timeout(self.send_timeout))?
            .map_err(|e| DeliveryError::Publish(Arc::new(e)));

        debug!(
            partition = %batch.key(),
            elapsed = ?started.elapsed(),
            "publish call returned"
        );
        result
    }

    /// Refuses every send still waiting for a slot, and all later ones, with
    /// [`DeliveryError::GateClosed`]. Sends already holding a slot finish.
    pub fn shut(&self) {
        self.slots.close();
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn in_flight(&self) -> usize {
        self.max_slots - self.slots.available_permits()
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            batches_sent: self.counters.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.counters.batches_failed.load(Ordering::Relaxed),
            events_sent: self.counters.events_sent.load(Ordering::Relaxed),
            events_failed: self.counters.events_failed.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }
}
