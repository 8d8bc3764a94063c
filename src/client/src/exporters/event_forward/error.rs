use std::fmt;

/// Errors that can occur while forwarding a batch over HTTP
#[derive(Debug)]
pub enum EventForwardError {
    /// Failed to serialize the batch to JSON
    Serialization(serde_json::Error),

    /// Network request failed
    Network(reqwest::Error),

    /// Server returned non-2XX status code
    Server { status: u16, body: String },
}

impl fmt::Display for EventForwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventForwardError::Serialization(e) => write!(f, "Failed to serialize batch: {}", e),
            EventForwardError::Network(e) => write!(f, "Network request failed: {}", e),
            EventForwardError::Server { status, body } => {
                write!(f, "Server error {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for EventForwardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventForwardError::Serialization(e) => Some(e),
            EventForwardError::Network(e) => Some(e),
            EventForwardError::Server { .. } => None,
        }
    }
}

impl From<serde_json::Error> for EventForwardError {
    fn from(err: serde_json::Error) -> Self {
        EventForwardError::Serialization(err)
    }
}

impl From<reqwest::Error> for EventForwardError {
    fn from(err: reqwest::Error) -> Self {
        EventForwardError::Network(err)
    }
}

impl EventForwardError {
    pub fn server_error(status: u16, body: String) -> Self {
        EventForwardError::Server { status, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            EventForwardError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for event forwarding operations
pub type EventForwardResult<T> = Result<T, EventForwardError>;
