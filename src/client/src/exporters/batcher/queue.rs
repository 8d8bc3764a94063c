use super::error::DeliveryError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use telemetry_common::event::Event;
use tokio::time::Instant;

/// Invoked exactly once with the delivery outcome of the batch that carried
/// the event. Never invoked for an event that was dropped or rejected.
pub type CompletionCallback = Box<dyn FnOnce(Result<(), DeliveryError>) + Send + 'static>;

pub struct QueuedEvent {
    pub event: Event,
    pub callback: Option<CompletionCallback>,
}

impl QueuedEvent {
    pub fn new(event: Event, callback: Option<CompletionCallback>) -> Self {
        QueuedEvent { event, callback }
    }
}

impl std::fmt::Debug for QueuedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedEvent")
            .field("event", &self.event.id())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended; `len` is the queue length right after the append
    Accepted { len: usize },
    /// Queue was full; the event was discarded
    Dropped { consecutive_drops: u64 },
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted { .. })
    }
}

struct QueueState {
    events: VecDeque<QueuedEvent>,
    armed_at: Option<Instant>,
    consecutive_drops: u64,
}

/// Capacity-bounded pending events of one partition.
///
/// Every operation takes the single lock for the duration of the list
/// operation only; nothing blocks or awaits while it is held.
pub struct BoundedQueue {
    capacity: usize,
    state: Mutex<QueueState>,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        BoundedQueue {
            capacity,
            state: Mutex::new(QueueState {
                events: VecDeque::with_capacity(capacity),
                armed_at: None,
                consecutive_drops: 0,
            }),
        }
    }

    // the state stays consistent across a panicking holder, so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Never blocks. Arms the flush timer on the empty to non-empty
    /// transition only.
    pub fn add(&self, item: QueuedEvent) -> Admission {
        let mut state = self.lock();

        if state.events.len() >= self.capacity {
            state.consecutive_drops += 1;
            return Admission::Dropped {
                consecutive_drops: state.consecutive_drops,
            };
        }

        if state.events.is_empty() {
            state.armed_at = Some(Instant::now());
        }
        state.events.push_back(item);
        state.consecutive_drops = 0;

        Admission::Accepted {
            len: state.events.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the queued events, leaving the queue untouched.
    pub fn values(&self) -> Vec<Event> {
        self.lock()
            .events
            .iter()
            .map(|queued| queued.event.clone())
            .collect()
    }

    /// Removes everything at once and disarms the timer.
    pub fn drain(&self) -> Vec<QueuedEvent> {
        let mut state = self.lock();
        state.armed_at = None;
        state.events.drain(..).collect()
    }

    /// When the queue last went from empty to non-empty, `None` while empty.
    pub fn armed_at(&self) -> Option<Instant> {
        self.lock().armed_at
    }

    pub fn consecutive_drops(&self) -> u64 {
        self.lock().consecutive_drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn queued(body: &str) -> QueuedEvent {
        QueuedEvent::new(Event::for_partition("d1", "e1", body), None)
    }

    fn bodies(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|e| String::from_utf8_lossy(e.body()).into_owned())
            .collect()
    }

    #[test]
    fn test_add_until_full() {
        let queue = BoundedQueue::new(3);

        assert_eq!(queue.add(queued("a")), Admission::Accepted { len: 1 });
        assert_eq!(queue.add(queued("b")), Admission::Accepted { len: 2 });
        assert_eq!(queue.add(queued("c")), Admission::Accepted { len: 3 });
        assert_eq!(
            queue.add(queued("d")),
            Admission::Dropped {
                consecutive_drops: 1
            }
        );
        assert_eq!(
            queue.add(queued("e")),
            Admission::Dropped {
                consecutive_drops: 2
            }
        );

        assert_eq!(queue.len(), 3);
        assert_eq!(bodies(&queue.values()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_successful_add_resets_drop_counter() {
        let queue = BoundedQueue::new(1);
        queue.add(queued("a"));
        assert!(!queue.add(queued("b")).is_accepted());
        assert!(!queue.add(queued("c")).is_accepted());
        assert_eq!(queue.consecutive_drops(), 2);

        queue.drain();
        assert!(queue.add(queued("d")).is_accepted());
        assert_eq!(queue.consecutive_drops(), 0);
    }

    #[test]
    fn test_values_does_not_mutate() {
        let queue = BoundedQueue::new(5);
        queue.add(queued("a"));
        queue.add(queued("b"));

        assert_eq!(queue.values().len(), 2);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_drain_empties_and_disarms() {
        let queue = BoundedQueue::new(5);
        assert!(queue.armed_at().is_none());

        queue.add(queued("a"));
        let armed = queue.armed_at().unwrap();
        queue.add(queued("b"));
        assert_eq!(queue.armed_at(), Some(armed));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].event.body(), b"a");
        assert_eq!(drained[1].event.body(), b"b");
        assert!(queue.is_empty());
        assert!(queue.armed_at().is_none());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_concurrent_adds_never_exceed_capacity() {
        let queue = Arc::new(BoundedQueue::new(50));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|i| queue.add(queued(&format!("{t}-{i}"))).is_accepted())
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(accepted, 50);
        assert_eq!(queue.len(), 50);
        assert_eq!(queue.drain().len(), 50);
    }
}
