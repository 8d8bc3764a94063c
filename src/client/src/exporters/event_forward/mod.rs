//! HTTP forwarding of batches to a remote ingestion endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! # use telemetry_client::exporters::event_forward::EventForward;
//! # use telemetry_common::batch::Batch;
//! # use telemetry_common::event::{Event, PartitionKey};
//! #
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let forwarder = EventForward::new("https://ingest.example.com/events");
//! let key = PartitionKey::new("platform", "WorkflowEvent");
//! let batch = Batch::try_new(key, vec![Event::for_partition("platform", "WorkflowEvent", "{}")])
//!     .expect("non-empty");
//! forwarder.send_batch(&batch).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::EventForward;
pub use error::{EventForwardError, EventForwardResult};
