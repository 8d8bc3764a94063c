use crate::exporters::batch_publisher::{BatchPublisher, PublishResponse};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use telemetry_common::batch::Batch;

/// In-memory publisher recording every batch it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    batches: Mutex<Vec<Batch>>,
    delay: Option<Duration>,
    fail: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        RecordingPublisher {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches().iter().map(Batch::len).collect()
    }

    pub fn event_count(&self) -> usize {
        self.batch_sizes().iter().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Polls until at least `count` batches arrived or `within` elapsed.
    pub async fn wait_for_batches(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.batches.lock().unwrap().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.batches.lock().unwrap().len() >= count
    }
}

impl BatchPublisher for RecordingPublisher {
    async fn publish_batch(&self, batch: &Batch) -> Result<PublishResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.batches.lock().unwrap().push(batch.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            bail!("ingestion endpoint rejected batch");
        }

        Ok(PublishResponse {
            accepted: batch.len(),
        })
    }
}
