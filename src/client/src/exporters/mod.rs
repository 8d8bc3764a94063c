pub mod batch_publisher;
pub mod batcher;
pub mod event_forward;
