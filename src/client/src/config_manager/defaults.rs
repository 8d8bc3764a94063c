use crate::config_manager::Config;
use telemetry_common::constants::{
    BATCH_INTERVAL_MS, CLOSE_GRACE_PERIOD_MS, DEFAULT_LOG_LEVEL, MAX_BATCH_SIZE,
    MAX_CONCURRENT_SENDS, QUEUE_CAPACITY, SEND_TIMEOUT_MS,
};

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: QUEUE_CAPACITY,
            max_batch_size: MAX_BATCH_SIZE,
            batch_interval_ms: BATCH_INTERVAL_MS,
            send_timeout_ms: SEND_TIMEOUT_MS,
            max_concurrent_sends: MAX_CONCURRENT_SENDS,
            close_grace_period_ms: CLOSE_GRACE_PERIOD_MS,

            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,

            event_forward_endpoint: None,
        }
    }
}
