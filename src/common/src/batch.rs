use crate::event::{Event, PartitionKey};
use serde::Serialize;

/// Events from a single partition, sent in one publish call.
///
/// A batch is never empty; callers that may end up with nothing to send go
/// through [`Batch::try_new`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Batch {
    key: PartitionKey,
    events: Vec<Event>,
}

impl Batch {
    pub fn try_new(key: PartitionKey, events: Vec<Event>) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        Some(Batch { key, events })
    }

    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    // always false, kept for clippy's len_without_is_empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
