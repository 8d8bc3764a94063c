use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use telemetry_common::event::PartitionKeyError;

/// Synchronous failures returned from `emit`. A full queue is deliberately not
/// one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// `domain` or `entity` is absent or empty; the event was not enqueued
    MissingPartitionKey { attribute: &'static str },

    /// The pool has started closing and no longer accepts events
    Closed,

    /// No process-wide emitter has been installed
    NoGlobalEmitter,
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::MissingPartitionKey { attribute } => {
                write!(f, "event is missing partition key attribute `{}`", attribute)
            }
            EmitError::Closed => write!(f, "event pool is closed"),
            EmitError::NoGlobalEmitter => write!(f, "no global event emitter installed"),
        }
    }
}

impl std::error::Error for EmitError {}

impl From<PartitionKeyError> for EmitError {
    fn from(err: PartitionKeyError) -> Self {
        match err {
            PartitionKeyError::MissingAttribute(attribute) => {
                EmitError::MissingPartitionKey { attribute }
            }
        }
    }
}

/// Why a batch did not reach the remote endpoint. Cloned into every
/// completion callback of the batch.
#[derive(Debug, Clone)]
pub enum DeliveryError {
    /// The publisher returned an error
    Publish(Arc<anyhow::Error>),

    /// The publisher did not answer within the send timeout
    Timeout(Duration),

    /// The admission gate was shut before a slot became free
    GateClosed,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Publish(e) => write!(f, "batch publish failed: {:#}", e),
            DeliveryError::Timeout(timeout) => {
                write!(f, "batch publish timed out after {:?}", timeout)
            }
            DeliveryError::GateClosed => write!(f, "delivery gate closed"),
        }
    }
}

impl std::error::Error for DeliveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeliveryError::Publish(e) => {
                let source: &(dyn std::error::Error + 'static) = e.as_ref().as_ref();
                Some(source)
            }
            DeliveryError::Timeout(_) | DeliveryError::GateClosed => None,
        }
    }
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Timeout(_))
    }
}
