use super::delivery::DeliveryGate;
use super::queue::QueuedEvent;
use super::worker::PartitionWorker;
use crate::exporters::batch_publisher::BatchPublisher;
use std::sync::Arc;
use std::time::Duration;
use telemetry_common::batch::Batch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Size,
    Timer,
    Shutdown,
}

/// Turns one partition's queue into batches.
///
/// A flush happens when the queue reaches `max_batch_size`, when
/// `batch_interval` has passed since the queue last became non-empty, or once
/// more on shutdown. Sends are awaited in order, so batches of one partition
/// never overlap.
pub struct BatchAssembler<P> {
    worker: Arc<PartitionWorker>,
    gate: Arc<DeliveryGate<P>>,
    batch_interval: Duration,
    shutdown: CancellationToken,
}

impl<P: BatchPublisher> BatchAssembler<P> {
    pub fn new(
        worker: Arc<PartitionWorker>,
        gate: Arc<DeliveryGate<P>>,
        batch_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        BatchAssembler {
            worker,
            gate,
            batch_interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        debug!(partition = %self.worker.key(), "flush loop started");

        loop {
            match self.next_trigger().await {
                Trigger::Shutdown => break,
                trigger => {
                    let flushed = self.flush().await;
                    debug!(partition = %self.worker.key(), ?trigger, flushed, "flushed");
                }
            }
        }

        let flushed = self.flush().await;
        debug!(partition = %self.worker.key(), flushed, "final flush on shutdown");
    }

    async fn next_trigger(&self) -> Trigger {
        let queue = self.worker.queue();

        let armed_at = loop {
            if let Some(armed_at) = queue.armed_at() {
                break armed_at;
            }
            tokio::select! {
                _ = self.shutdown.cancelled() => return Trigger::Shutdown,
                _ = self.worker.woken() => {}
            }
        };

        // the deadline only depends on when the queue became non-empty, later
        // adds never push it back
        let deadline = armed_at + self.batch_interval;
        loop {
            if queue.len() >= self.worker.max_batch_size() {
                return Trigger::Size;
            }
            tokio::select! {
                _ = self.shutdown.cancelled() => return Trigger::Shutdown,
                _ = tokio::time::sleep_until(deadline) => return Trigger::Timer,
                _ = self.worker.woken() => {}
            }
        }
    }

    /// Drains the queue and sends it as consecutive batches of at most
    /// `max_batch_size` events. Returns how many events were drained.
    pub async fn flush(&self) -> usize {
        let mut remaining = self.worker.queue().drain();
        let drained = remaining.len();
        let max_batch_size = self.worker.max_batch_size();

        while !remaining.is_empty() {
            let rest = remaining.split_off(remaining.len().min(max_batch_size));
            let chunk = std::mem::replace(&mut remaining, rest);

            let mut events = Vec::with_capacity(chunk.len());
            let mut callbacks = Vec::new();
            for QueuedEvent { event, callback } in chunk {
                events.push(event);
                callbacks.extend(callback);
            }

            if let Some(batch) = Batch::try_new(self.worker.key().clone(), events) {
                // failures are logged and counted by the gate
                let _ = self.gate.deliver(batch, callbacks).await;
            }
        }

        drained
    }
}
