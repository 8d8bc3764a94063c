use super::error::{EventForwardError, EventForwardResult};
use crate::exporters::batch_publisher::{BatchPublisher, PublishResponse};
use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::time::Instant;
use telemetry_common::batch::Batch;
use telemetry_common::event::Event;
use tracing::debug;

#[derive(Serialize)]
struct BatchPayload<'a> {
    domain: &'a str,
    entity: &'a str,
    events: &'a [Event],
}

/// HTTP client forwarding batches as JSON to a remote ingestion endpoint.
#[derive(Clone)]
pub struct EventForward {
    endpoint: String,
    client: Client,
}

impl EventForward {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        EventForward {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single POST, no retry.
    pub async fn send_batch(&self, batch: &Batch) -> EventForwardResult<PublishResponse> {
        let start_time = Instant::now();
        let payload = BatchPayload {
            domain: batch.key().domain(),
            entity: batch.key().entity(),
            events: batch.events(),
        };
        let body = serde_json::to_vec(&payload)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventForwardError::server_error(status.as_u16(), body));
        }

        debug!(
            "Forwarded {} events for {} to {}, elapsed: {:?}",
            batch.len(),
            batch.key(),
            self.endpoint,
            start_time.elapsed()
        );

        Ok(PublishResponse {
            accepted: batch.len(),
        })
    }
}

impl BatchPublisher for EventForward {
    async fn publish_batch(&self, batch: &Batch) -> Result<PublishResponse> {
        Ok(self.send_batch(batch).await?)
    }
}
