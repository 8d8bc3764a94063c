//! Process-wide emitter slot for code that cannot thread a pool handle
//! through its call chain.

use crate::exporters::batcher::{CompletionCallback, EmitError, EventEmitter};
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};
use telemetry_common::event::Event;

static GLOBAL_EMITTER: Lazy<RwLock<Option<Arc<dyn EventEmitter>>>> =
    Lazy::new(|| RwLock::new(None));

/// Installs `emitter`, returning whatever was installed before.
pub fn set_global_emitter(emitter: Arc<dyn EventEmitter>) -> Option<Arc<dyn EventEmitter>> {
    GLOBAL_EMITTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(emitter)
}

pub fn global_emitter() -> Option<Arc<dyn EventEmitter>> {
    GLOBAL_EMITTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn clear_global_emitter() -> Option<Arc<dyn EventEmitter>> {
    GLOBAL_EMITTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

pub fn emit(event: Event) -> Result<(), EmitError> {
    global_emitter()
        .ok_or(EmitError::NoGlobalEmitter)?
        .emit(event)
}

pub fn emit_with_callback(event: Event, callback: CompletionCallback) -> Result<(), EmitError> {
    global_emitter()
        .ok_or(EmitError::NoGlobalEmitter)?
        .emit_with_callback(event, callback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingEmitter {
        events: Mutex<Vec<Event>>,
    }

    impl EventEmitter for CollectingEmitter {
        fn emit(&self, event: Event) -> Result<(), EmitError> {
            event.partition_key()?;
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        fn emit_with_callback(
            &self,
            event: Event,
            callback: CompletionCallback,
        ) -> Result<(), EmitError> {
            self.emit(event)?;
            callback(Ok(()));
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn test_emit_without_emitter_fails() {
        clear_global_emitter();

        let err = emit(Event::for_partition("platform", "WorkflowEvent", "x")).unwrap_err();
        assert_eq!(err, EmitError::NoGlobalEmitter);
    }

    #[test]
    #[serial]
    fn test_emit_goes_to_installed_emitter() {
        let emitter = Arc::new(CollectingEmitter::default());
        set_global_emitter(emitter.clone());

        emit(Event::for_partition("platform", "WorkflowEvent", "x")).unwrap();
        let err = emit(Event::new("no key")).unwrap_err();
        assert_eq!(err, EmitError::MissingPartitionKey { attribute: "domain" });

        assert_eq!(emitter.events.lock().unwrap().len(), 1);
        assert!(clear_global_emitter().is_some());
        assert!(global_emitter().is_none());
    }

    #[test]
    #[serial]
    fn test_set_returns_previous_emitter() {
        clear_global_emitter();
        let first: Arc<dyn EventEmitter> = Arc::new(CollectingEmitter::default());
        let second: Arc<dyn EventEmitter> = Arc::new(CollectingEmitter::default());

        assert!(set_global_emitter(first.clone()).is_none());
        let previous = set_global_emitter(second).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));

        clear_global_emitter();
    }
}
