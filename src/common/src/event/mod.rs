pub mod partition_key;

use crate::constants::{DOMAIN_ATTRIBUTE, ENTITY_ATTRIBUTE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;
use uuid::Uuid;

pub use partition_key::{PartitionKey, PartitionKeyError};

/// String attributes attached to an event. `domain` and `entity` are reserved
/// and together select the partition the event is batched into.
pub type EventAttributes = BTreeMap<String, String>;

/// A single telemetry event.
///
/// Events are immutable once built: fields are private and only exposed
/// through accessors. Use [`Event::builder`] or [`Event::new`] followed by
/// [`Event::with_attribute`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TypedBuilder)]
pub struct Event {
    #[builder(default = Uuid::new_v4())]
    id: Uuid,

    #[builder(default = Utc::now())]
    timestamp: DateTime<Utc>,

    #[builder(setter(into))]
    body: Vec<u8>,

    #[builder(default)]
    attributes: EventAttributes,
}

impl Event {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Event::builder().body(body).build()
    }

    /// Shorthand for an event already tagged with its partition attributes.
    pub fn for_partition(
        domain: impl Into<String>,
        entity: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Event::new(body)
            .with_attribute(DOMAIN_ATTRIBUTE, domain)
            .with_attribute(ENTITY_ATTRIBUTE, entity)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn attributes(&self) -> &EventAttributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn partition_key(&self) -> Result<PartitionKey, PartitionKeyError> {
        PartitionKey::from_attributes(&self.attributes)
    }
}
