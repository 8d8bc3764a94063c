use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct IngestState {
    received: Arc<Mutex<Vec<Value>>>,
    reject: Arc<AtomicBool>,
}

/// Local stand-in for the remote ingestion endpoint. Records every POSTed
/// batch body, or answers 503 while rejecting.
pub struct IngestServer {
    addr: SocketAddr,
    state: IngestState,
    handle: JoinHandle<()>,
}

impl IngestServer {
    pub async fn launch() -> anyhow::Result<Self> {
        let state = IngestState::default();
        let app = Router::new()
            .route("/events", post(ingest))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(IngestServer {
            addr,
            state,
            handle,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/events", self.addr)
    }

    pub fn set_rejecting(&self, reject: bool) {
        self.state.reject.store(reject, Ordering::SeqCst);
    }

    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    pub async fn wait_for_batches(&self, count: usize, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.received().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received().len() >= count
    }
}

impl Drop for IngestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn ingest(State(state): State<IngestState>, Json(batch): Json<Value>) -> StatusCode {
    if state.reject.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    state.received.lock().unwrap().push(batch);
    StatusCode::ACCEPTED
}
