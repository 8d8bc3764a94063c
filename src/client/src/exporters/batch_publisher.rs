use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use telemetry_common::batch::Batch;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishResponse {
    pub accepted: usize,
}

/// The remote side of the pipeline: sends one batch and reports the outcome.
///
/// Implementations own their transport-level concerns. The batching core
/// wraps every call in its own send timeout and never retries.
pub trait BatchPublisher: Send + Sync + 'static {
    fn publish_batch(&self, batch: &Batch) -> impl Future<Output = Result<PublishResponse>> + Send;
}

impl<P: BatchPublisher> BatchPublisher for Arc<P> {
    fn publish_batch(&self, batch: &Batch) -> impl Future<Output = Result<PublishResponse>> + Send {
        self.as_ref().publish_batch(batch)
    }
}
