//! # Logging Configuration Tests
//!
//! Tests for structured logging setup and configuration.

mod logging_config_tests {
    use logging::{LogFormat, LoggingConfig};

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.environment, "development");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_format_display_round_trips_through_parse() {
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }
}

mod request_id_tests {
    use logging::RequestId;

    #[test]
    fn test_request_id_uniqueness() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Request IDs should be unique");
    }

    #[test]
    fn test_generated_id_survives_header_round_trip() {
        let id = RequestId::new();
        assert_eq!(RequestId::from_header(id.as_str()), Some(id));
    }
}

mod macro_tests {
    #[test]
    fn test_macros_expand_without_subscriber() {
        logging::log_api_request!("POST", "/api/leads", 201, 7, "req-12345678");
        logging::log_db_query!("insert", "leads", 3);
        logging::log_auth_event!("login", "user@example.com", true);
    }
}
