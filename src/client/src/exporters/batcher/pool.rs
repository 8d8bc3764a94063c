use super::assembler::BatchAssembler;
use super::delivery::{DeliveryGate, DeliveryStats};
use super::error::{DeliveryError, EmitError};
use super::queue::{CompletionCallback, QueuedEvent};
use super::worker::PartitionWorker;
use crate::config_manager::Config;
use crate::exporters::batch_publisher::BatchPublisher;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use telemetry_common::event::{Event, PartitionKey};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Object-safe emit surface, implemented by [`PartitionedWorkerPool`] and
/// used by the process-wide emitter slot.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: Event) -> Result<(), EmitError>;

    fn emit_with_callback(&self, event: Event, callback: CompletionCallback)
        -> Result<(), EmitError>;
}

/// Routes events to one worker per `(domain, entity)` partition.
///
/// Workers are created on first use and live as long as the pool. Emitting
/// never blocks: a full partition drops the event and logs a throttled
/// warning instead of returning an error.
pub struct PartitionedWorkerPool<P: BatchPublisher> {
    config: Config,
    workers: RwLock<HashMap<PartitionKey, Arc<PartitionWorker>>>,
    gate: Arc<DeliveryGate<P>>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    runtime: Handle,
    closed: AtomicBool,
}

impl<P: BatchPublisher> PartitionedWorkerPool<P> {
    /// Must be called from within a tokio runtime; flush loops and sends run
    /// on that runtime even when events are emitted from other threads.
    pub fn new(config: Config, publisher: P) -> Result<Self> {
        config.validate().context("invalid batching config")?;
        let runtime = Handle::try_current()
            .context("PartitionedWorkerPool must be created inside a tokio runtime")?;

        let tracker = TaskTracker::new();
        let gate = Arc::new(DeliveryGate::new(
            publisher,
            config.max_concurrent_sends,
            config.send_timeout(),
            tracker.clone(),
        ));

        info!(
            queue_capacity = config.queue_capacity,
            max_batch_size = config.max_batch_size,
            batch_interval = ?config.batch_interval(),
            send_timeout = ?config.send_timeout(),
            max_concurrent_sends = config.max_concurrent_sends,
            "event pool started"
        );

        Ok(PartitionedWorkerPool {
            config,
            workers: RwLock::new(HashMap::new()),
            gate,
            shutdown: CancellationToken::new(),
            tracker,
            runtime,
            closed: AtomicBool::new(false),
        })
    }

    pub fn emit(&self, event: Event) -> Result<(), EmitError> {
        self.enqueue(event, None)
    }

    /// Like [`emit`](Self::emit); `callback` runs once the batch holding the
    /// event was sent or failed. It never runs if the event is rejected or
    /// dropped on a full queue.
    pub fn emit_with_callback(
        &self,
        event: Event,
        callback: impl FnOnce(Result<(), DeliveryError>) + Send + 'static,
    ) -> Result<(), EmitError> {
        self.enqueue(event, Some(Box::new(callback)))
    }

    // The closed check and the offer run under the `workers` lock that
    // `close` takes exclusively to flip `closed`, so every accepted offer
    // lands before cancellation and is seen by the final flush.
    fn enqueue(&self, event: Event, callback: Option<CompletionCallback>) -> Result<(), EmitError> {
        let key = event.partition_key()?;
        let item = QueuedEvent::new(event, callback);

        {
            let workers = self.workers.read().unwrap_or_else(PoisonError::into_inner);
            if self.closed.load(Ordering::Acquire) {
                return Err(EmitError::Closed);
            }
            if let Some(worker) = workers.get(&key) {
                // a drop is reported by the worker and is not an emit error
                worker.offer(item);
                return Ok(());
            }
        }

        let mut workers = self.workers.write().unwrap_or_else(PoisonError::into_inner);
        if self.closed.load(Ordering::Acquire) {
            return Err(EmitError::Closed);
        }
        // another emitter may have created it between the two locks
        let worker = match workers.get(&key) {
            Some(worker) => Arc::clone(worker),
            None => {
                let worker = self.start_worker(key.clone());
                workers.insert(key, Arc::clone(&worker));
                worker
            }
        };
        worker.offer(item);

        Ok(())
    }

    fn start_worker(&self, key: PartitionKey) -> Arc<PartitionWorker> {
        let worker = Arc::new(PartitionWorker::new(
            key,
            self.config.queue_capacity,
            self.config.max_batch_size,
        ));
        let assembler = BatchAssembler::new(
            Arc::clone(&worker),
            Arc::clone(&self.gate),
            self.config.batch_interval(),
            self.shutdown.clone(),
        );
        self.tracker.spawn_on(assembler.run(), &self.runtime);
        debug!(partition = %worker.key(), "created partition worker");

        worker
    }

    /// Stops accepting events, runs the final flush of every partition and
    /// waits for admitted sends and their callbacks, at most for the close
    /// grace period. Calling it again is harmless.
    pub async fn close(&self) -> Result<()> {
        {
            let _workers = self.workers.write().unwrap_or_else(PoisonError::into_inner);
            if self.closed.swap(true, Ordering::AcqRel) {
                debug!("event pool already closing");
            }
        }

        self.shutdown.cancel();
        self.tracker.close();

        let grace = self.config.close_grace_period();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                pending_tasks = self.tracker.len(),
                "event pool did not drain within {:?}", grace
            );
            // sends still waiting for a slot give up instead of outliving close
            self.gate.shut();
            bail!(
                "timed out after {:?} waiting for {} pending flush/send tasks",
                grace,
                self.tracker.len()
            );
        }

        let stats = self.stats();
        info!(
            partitions = self.partition_count(),
            batches_sent = stats.batches_sent,
            batches_failed = stats.batches_failed,
            events_sent = stats.events_sent,
            "event pool closed"
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn partition_count(&self) -> usize {
        self.workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn partitions(&self) -> Vec<PartitionKey> {
        let mut keys: Vec<PartitionKey> = self
            .workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn worker(&self, key: &PartitionKey) -> Option<Arc<PartitionWorker>> {
        self.workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Events currently buffered for `key`, oldest first.
    pub fn pending_events(&self, key: &PartitionKey) -> Vec<Event> {
        self.worker(key)
            .map(|worker| worker.queue().values())
            .unwrap_or_default()
    }

    /// Number of "buffer full" warnings logged for `key` so far.
    pub fn drop_warnings(&self, key: &PartitionKey) -> u64 {
        self.worker(key)
            .map(|worker| worker.reporter().warnings_logged())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.gate.stats()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        self.gate.publisher()
    }
}

impl<P: BatchPublisher> EventEmitter for PartitionedWorkerPool<P> {
    fn emit(&self, event: Event) -> Result<(), EmitError> {
        self.enqueue(event, None)
    }

    fn emit_with_callback(
        &self,
        event: Event,
        callback: CompletionCallback,
    ) -> Result<(), EmitError> {
        self.enqueue(event, Some(callback))
    }
}

impl<P: BatchPublisher> Drop for PartitionedWorkerPool<P> {
    // without close() the loops still get their final flush on the runtime
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
