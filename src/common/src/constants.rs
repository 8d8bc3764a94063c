pub const DOMAIN_ATTRIBUTE: &str = "domain";
pub const ENTITY_ATTRIBUTE: &str = "entity";

pub const QUEUE_CAPACITY: usize = 100;
pub const MAX_BATCH_SIZE: usize = 50;
pub const BATCH_INTERVAL_MS: u64 = 500;
pub const SEND_TIMEOUT_MS: u64 = 10_000;
pub const MAX_CONCURRENT_SENDS: usize = 1;
pub const CLOSE_GRACE_PERIOD_MS: u64 = 15_000;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "TELEMETRY";
