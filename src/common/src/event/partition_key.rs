use crate::constants::{DOMAIN_ATTRIBUTE, ENTITY_ATTRIBUTE};
use crate::event::EventAttributes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the logical stream an event belongs to.
///
/// Both components are kept separately, so equality and hashing never depend
/// on how a joined string happens to split: `("a:b", "c")` and `("a", "b:c")`
/// are different keys even though they render the same.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    domain: String,
    entity: String,
}

impl PartitionKey {
    pub fn new(domain: impl Into<String>, entity: impl Into<String>) -> Self {
        PartitionKey {
            domain: domain.into(),
            entity: entity.into(),
        }
    }

    /// Derives the key from the reserved `domain` / `entity` attributes.
    /// Absent and empty values are both treated as missing.
    pub fn from_attributes(attributes: &EventAttributes) -> Result<Self, PartitionKeyError> {
        let lookup = |name: &'static str| {
            attributes
                .get(name)
                .filter(|value| !value.is_empty())
                .ok_or(PartitionKeyError::MissingAttribute(name))
        };

        let domain = lookup(DOMAIN_ATTRIBUTE)?;
        let entity = lookup(ENTITY_ATTRIBUTE)?;

        Ok(PartitionKey::new(domain.as_str(), entity.as_str()))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.entity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionKeyError {
    MissingAttribute(&'static str),
}

impl fmt::Display for PartitionKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionKeyError::MissingAttribute(name) => {
                write!(f, "missing partition key attribute `{}`", name)
            }
        }
    }
}

impl std::error::Error for PartitionKeyError {}
