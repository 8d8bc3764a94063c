pub mod config_manager;
pub mod exporters;
pub mod global;
pub mod logging;

pub use config_manager::{Config, ConfigLoader};
pub use exporters::batch_publisher::{BatchPublisher, PublishResponse};
pub use exporters::batcher::{DeliveryError, EmitError, EventEmitter, PartitionedWorkerPool};
pub use exporters::event_forward::EventForward;
