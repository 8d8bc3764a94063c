//! Partitioned batching of events in front of a [`BatchPublisher`].
//!
//! Every `(domain, entity)` pair gets its own bounded queue and flush loop.
//! Batches of one partition are sent strictly one after another, while a
//! shared gate caps how many sends run at once across partitions.
//!
//! [`BatchPublisher`]: crate::exporters::batch_publisher::BatchPublisher

mod assembler;
mod backpressure;
mod delivery;
mod error;
mod pool;
mod queue;
mod worker;

#[cfg(test)]
mod test_support;

pub use assembler::BatchAssembler;
pub use backpressure::BackpressureReporter;
pub use delivery::{DeliveryGate, DeliveryStats};
pub use error::{DeliveryError, EmitError};
pub use pool::{EventEmitter, PartitionedWorkerPool};
pub use queue::{Admission, BoundedQueue, CompletionCallback, QueuedEvent};
pub use worker::PartitionWorker;
