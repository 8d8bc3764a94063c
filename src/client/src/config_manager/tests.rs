#[cfg(test)]
mod tests {
    use crate::config_manager::{Config, ConfigLoader};
    use rstest::rstest;
    use serial_test::serial;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    #[serial]
    fn test_default_config() {
        let config = ConfigLoader::load_default_config().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.max_batch_size, 50);
        assert_eq!(config.batch_interval(), Duration::from_millis(500));
        assert_eq!(config.send_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_concurrent_sends, 1);
        assert!(config.event_forward_endpoint.is_none());
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
queue_capacity = 3
max_batch_size = 5
batch_interval_ms = 10000
event_forward_endpoint = "http://127.0.0.1:9000/events"
"#
        )
        .unwrap();

        let config = ConfigLoader::load_config(Some(file.path())).unwrap();

        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.max_batch_size, 5);
        assert_eq!(config.batch_interval(), Duration::from_secs(10));
        assert_eq!(config.send_timeout_ms, 10_000);
        assert_eq!(
            config.event_forward_endpoint.as_deref(),
            Some("http://127.0.0.1:9000/events")
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_defaults() {
        std::env::set_var("TELEMETRY_MAX_CONCURRENT_SENDS", "4");
        std::env::set_var("TELEMETRY_LOG_LEVEL", "debug");

        let config = ConfigLoader::load_default_config();

        std::env::remove_var("TELEMETRY_MAX_CONCURRENT_SENDS");
        std::env::remove_var("TELEMETRY_LOG_LEVEL");

        let config = config.unwrap();
        assert_eq!(config.max_concurrent_sends, 4);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        let result = ConfigLoader::load_config(Some(std::path::Path::new(
            "/nonexistent/telemetry.toml",
        )));
        assert!(result.is_err());
    }

    #[rstest]
    #[case::zero_capacity(Config { queue_capacity: 0, ..Config::default() }, "queue_capacity")]
    #[case::zero_batch(Config { max_batch_size: 0, ..Config::default() }, "max_batch_size")]
    #[case::zero_sends(Config { max_concurrent_sends: 0, ..Config::default() }, "max_concurrent_sends")]
    #[case::zero_interval(Config { batch_interval_ms: 0, ..Config::default() }, "batch_interval_ms")]
    #[case::zero_timeout(Config { send_timeout_ms: 0, ..Config::default() }, "send_timeout_ms")]
    fn test_validate_rejects(#[case] config: Config, #[case] field: &str) {
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(field));
    }

    #[test]
    fn test_capacity_below_batch_size_is_valid() {
        let config = Config {
            queue_capacity: 3,
            max_batch_size: 5,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
