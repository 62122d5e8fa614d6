//! Process configuration, read once at startup from `CIVIC_*` variables.
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_URL: &str = "file://data/civicreports.json";
pub const DEFAULT_ENVIRONMENT: &str = "development";
/// 10 MiB, large enough for inline base64 photos
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid listen address {0:?}")]
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `memory://` or `file://<path>`
    pub store_url: String,
    /// Label logged at startup (ex: "development", "production")
    pub environment: String,
    pub body_limit: usize,
    pub log_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_url: DEFAULT_STORE_URL.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            log_json: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source; unset or empty
    /// variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("CIVIC_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CIVIC_PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => defaults.port,
        };

        let body_limit = match get("CIVIC_BODY_LIMIT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CIVIC_BODY_LIMIT",
                expected: "a size in bytes",
                value: raw,
            })?,
            None => defaults.body_limit,
        };

        let log_json = match get("CIVIC_LOG_JSON") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: "CIVIC_LOG_JSON",
                expected: "a boolean",
                value: raw,
            })?,
            None => defaults.log_json,
        };

        Ok(Self {
            host: get("CIVIC_HOST").unwrap_or(defaults.host),
            port,
            store_url: get("CIVIC_STORE_URL").unwrap_or(defaults.store_url),
            environment: get("CIVIC_ENV").unwrap_or(defaults.environment),
            body_limit,
            log_json,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Address(raw))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.listen_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("CIVIC_HOST", "127.0.0.1"),
            ("CIVIC_PORT", "8080"),
            ("CIVIC_STORE_URL", "memory://"),
            ("CIVIC_ENV", "production"),
            ("CIVIC_BODY_LIMIT", "1024"),
            ("CIVIC_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.store_url, "memory://");
        assert_eq!(config.environment, "production");
        assert_eq!(config.body_limit, 1024);
        assert!(config.log_json);
    }

    #[test]
    fn test_plain_port_fallback() {
        let config = ApiConfig::from_lookup(lookup(&[("PORT", "5000")])).unwrap();
        assert_eq!(config.port, 5000);

        let config =
            ApiConfig::from_lookup(lookup(&[("PORT", "5000"), ("CIVIC_PORT", "6000")])).unwrap();
        assert_eq!(config.port, 6000);
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::from_lookup(lookup(&[("CIVIC_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CIVIC_PORT", .. }));

        let err = ApiConfig::from_lookup(lookup(&[("CIVIC_LOG_JSON", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CIVIC_LOG_JSON", .. }));
    }

    #[test]
    fn test_bad_host_is_address_error() {
        let config = ApiConfig {
            host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(config.listen_addr(), Err(ConfigError::Address(_))));
    }
}
