//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::portal::PortalConfig;
use crate::tracker::RateLimitConfig;
use crate::web::BasicAuth;

/// Address the server listens on unless `ISOR_BIND_ADDR` says otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Errors from reading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The listen address does not parse
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub portal: PortalConfig,
    pub limits: RateLimitConfig,
    /// Credentials API clients must present
    pub basic_auth: BasicAuth,
    /// JSON file of paint schemes; no colors when absent
    pub colors_path: Option<PathBuf>,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Read the configuration from `ISOR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let username = var("ISOR_USERNAME").ok_or(ConfigError::Missing("ISOR_USERNAME"))?;
        let password = var("ISOR_PASSWORD").ok_or(ConfigError::Missing("ISOR_PASSWORD"))?;

        let client_username = var("ISOR_BASIC_AUTH_USERNAME")
            .ok_or(ConfigError::Missing("ISOR_BASIC_AUTH_USERNAME"))?;
        let client_password = var("ISOR_BASIC_AUTH_PASSWORD")
            .ok_or(ConfigError::Missing("ISOR_BASIC_AUTH_PASSWORD"))?;

        let mut portal = PortalConfig::new(username, password);
        if let Some(base_url) = var("ISOR_BASE_URL") {
            portal = portal.with_base_url(base_url);
        }

        let bind = var("ISOR_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        Ok(Self {
            portal,
            limits: RateLimitConfig::default(),
            basic_auth: BasicAuth::new(client_username, client_password),
            colors_path: var("ISOR_COLORS_PATH").map(PathBuf::from),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const REQUIRED: [(&str, &str); 4] = [
        ("ISOR_USERNAME", "u"),
        ("ISOR_PASSWORD", "p"),
        ("ISOR_BASIC_AUTH_USERNAME", "client"),
        ("ISOR_BASIC_AUTH_PASSWORD", "hunter2"),
    ];

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn with_required(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        REQUIRED.iter().chain(extra).copied().collect()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.portal.credentials.username(), "u");
        assert_eq!(config.basic_auth, BasicAuth::new("client", "hunter2"));
        assert_eq!(config.portal.base_url, crate::portal::DEFAULT_BASE_URL);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.colors_path.is_none());
    }

    #[test]
    fn overrides() {
        let config = ServerConfig::from_lookup(lookup(&with_required(&[
            ("ISOR_BASE_URL", "http://localhost:8080/"),
            ("ISOR_COLORS_PATH", "/etc/isor/colors.json"),
            ("ISOR_BIND_ADDR", "0.0.0.0:8000"),
        ])))
        .unwrap();

        assert_eq!(config.portal.base_url, "http://localhost:8080/");
        assert_eq!(
            config.colors_path,
            Some(PathBuf::from("/etc/isor/colors.json"))
        );
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn missing_credentials() {
        let err = ServerConfig::from_lookup(lookup(&[("ISOR_USERNAME", "u")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ISOR_PASSWORD")));

        let err = ServerConfig::from_lookup(lookup(&[("ISOR_USERNAME", ""), ("ISOR_PASSWORD", "p")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "ISOR_USERNAME is not set");
    }

    #[test]
    fn client_credentials_are_required() {
        let err = ServerConfig::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ISOR_BASIC_AUTH_PASSWORD")));

        let err = ServerConfig::from_lookup(lookup(&[
            ("ISOR_USERNAME", "u"),
            ("ISOR_PASSWORD", "p"),
            ("ISOR_BASIC_AUTH_PASSWORD", "hunter2"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ISOR_BASIC_AUTH_USERNAME")));
    }

    #[test]
    fn bad_bind_addr() {
        let err = ServerConfig::from_lookup(lookup(&with_required(&[(
            "ISOR_BIND_ADDR",
            "localhost",
        )])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    }
}
