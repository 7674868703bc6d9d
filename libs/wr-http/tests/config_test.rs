#![allow(clippy::unwrap_used)]

use std::time::Duration;
use wr_http::{Client, ClientConfig, ClientError, DEFAULT_TIMEOUT};

const VARS: [&str; 4] = [
    "WR_API_BASE_URL",
    "WR_API_ORIGIN",
    "WR_API_TIMEOUT_MS",
    "WR_API_WITH_CREDENTIALS",
];

#[test]
fn test_config_from_env_defaults() {
    temp_env::with_vars_unset(VARS, || {
        let config = ClientConfig::from_env().unwrap();

        assert_eq!(config.base_address, "/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.default_headers["Content-Type"], "application/json");
        assert!(!config.forward_credentials);
        assert!(config.origin.is_none());
    });
}

#[test]
fn test_config_from_env_custom() {
    temp_env::with_vars(
        vec![
            ("WR_API_BASE_URL", Some("/api")),
            ("WR_API_ORIGIN", Some("https://qr.yayaxueqin.cn")),
            ("WR_API_TIMEOUT_MS", Some("2500")),
            ("WR_API_WITH_CREDENTIALS", Some("true")),
        ],
        || {
            let config = ClientConfig::from_env().unwrap();

            assert_eq!(config.timeout, Duration::from_millis(2500));
            assert!(config.forward_credentials);

            let client = Client::configure(config).unwrap();
            assert_eq!(client.base_url().as_str(), "https://qr.yayaxueqin.cn/api");
        },
    );
}

#[test]
fn test_config_from_env_invalid_timeout() {
    temp_env::with_vars(
        vec![
            ("WR_API_TIMEOUT_MS", Some("ten seconds")),
            ("WR_API_WITH_CREDENTIALS", None),
        ],
        || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, ClientError::BuildError(_)));
            assert!(err.to_string().contains("WR_API_TIMEOUT_MS"));
        },
    );
}

#[test]
fn test_config_from_env_invalid_credentials_flag() {
    temp_env::with_vars(
        vec![
            ("WR_API_TIMEOUT_MS", None),
            ("WR_API_WITH_CREDENTIALS", Some("sometimes")),
        ],
        || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("WR_API_WITH_CREDENTIALS"));
        },
    );
}

#[test]
fn test_relative_base_from_env_needs_origin() {
    temp_env::with_vars_unset(VARS, || {
        let config = ClientConfig::from_env().unwrap();
        let err = Client::configure(config).unwrap_err();
        assert!(err.to_string().contains("needs an origin"));
    });
}
