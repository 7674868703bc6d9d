use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ClientError;

/// Timeout used by both presets
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Base address used when none is configured; routed through the reverse proxy
pub const DEFAULT_BASE_ADDRESS: &str = "/api";

/// `Origin` header sent by the proxied preset
pub const H5_ORIGIN: &str = "https://k.innrgpower.com";

/// Client configuration, fixed for the lifetime of a [`Client`](crate::Client).
///
/// `base_address` is either an absolute URL or a path such as `/api`. A path
/// is resolved against `origin`, the absolute address the deployment's
/// reverse proxy forwards that path to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub base_address: String,
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
    pub default_headers: BTreeMap<String, String>,
    pub forward_credentials: bool,
    pub origin: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: json_headers(),
            forward_credentials: false,
            origin: None,
        }
    }
}

impl ClientConfig {
    /// Relative `/api` base behind a reverse proxy at `origin`, with an
    /// explicit `Origin` header and cookies forwarded on every request
    #[must_use]
    pub fn proxied(origin: impl Into<String>) -> Self {
        let mut default_headers = json_headers();
        default_headers.insert("Origin".to_owned(), H5_ORIGIN.to_owned());
        Self {
            base_address: DEFAULT_BASE_ADDRESS.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            default_headers,
            forward_credentials: true,
            origin: Some(origin.into()),
        }
    }

    /// Absolute base address, JSON content type only, no credential forwarding
    #[must_use]
    pub fn direct(base_address: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add or replace a default header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, forward: bool) -> Self {
        self.forward_credentials = forward;
        self
    }

    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `WR_API_BASE_URL`: base address (default: `/api`)
    /// - `WR_API_ORIGIN`: origin a relative base address resolves against
    /// - `WR_API_TIMEOUT_MS`: timeout in milliseconds (default: 10000)
    /// - `WR_API_WITH_CREDENTIALS`: `true`/`false`/`1`/`0` (default: false)
    ///
    /// # Errors
    /// `BuildError` if the timeout is not a whole number of milliseconds or
    /// the credentials flag is not one of the accepted spellings.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("WR_API_BASE_URL") {
            config.base_address = base;
        }
        config.origin = std::env::var("WR_API_ORIGIN").ok();

        if let Ok(raw) = std::env::var("WR_API_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                ClientError::BuildError(format!("WR_API_TIMEOUT_MS is not a number: {e}"))
            })?;
            config.timeout = Duration::from_millis(ms);
        }

        if let Ok(raw) = std::env::var("WR_API_WITH_CREDENTIALS") {
            config.forward_credentials = parse_flag(&raw).ok_or_else(|| {
                ClientError::BuildError(format!(
                    "WR_API_WITH_CREDENTIALS must be true or false, got {raw:?}"
                ))
            })?;
        }

        Ok(config)
    }
}

fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())])
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proxied_preset() {
        let config = ClientConfig::proxied("https://qr.yayaxueqin.cn");
        assert_eq!(config.base_address, "/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.default_headers["Content-Type"], "application/json");
        assert_eq!(config.default_headers["Origin"], H5_ORIGIN);
        assert!(config.forward_credentials);
        assert_eq!(config.origin.as_deref(), Some("https://qr.yayaxueqin.cn"));
    }

    #[test]
    fn test_direct_preset() {
        let config = ClientConfig::direct("https://qr.yayaxueqin.cn/api");
        assert_eq!(config.base_address, "https://qr.yayaxueqin.cn/api");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.default_headers.len(), 1);
        assert!(!config.default_headers.contains_key("Origin"));
        assert!(!config.forward_credentials);
    }

    #[test]
    fn test_builder_setters() {
        let config = ClientConfig::direct("http://localhost:8000/api")
            .with_timeout(Duration::from_millis(250))
            .with_header("X-Client", "h5")
            .with_credentials(true);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.default_headers["X-Client"], "h5");
        assert!(config.forward_credentials);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ClientConfig = serde_json::from_value(json!({
            "base_address": "https://qr.yayaxueqin.cn/api",
            "timeout_ms": 5000
        }))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.default_headers, json_headers());
        assert!(!config.forward_credentials);
        assert!(config.origin.is_none());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_value::<ClientConfig>(json!({"base_url": "/api"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_timeout_as_millis() {
        let value = serde_json::to_value(ClientConfig::default()).unwrap();
        assert_eq!(value["timeout_ms"], json!(10_000));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag("yes"), None);
    }
}
