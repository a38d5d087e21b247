//! Gateway configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. The upstream credential has no default.

use crate::error::ConfigError;
use secrecy::Secret;
use std::env;

/// Default upstream chat completions endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.deepseek.com/chat/completions";

/// Baseline model identifier used when a caller does not pick one
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// System prompt used by the relay when a caller does not supply one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream completion provider configuration
    pub upstream: UpstreamConfig,
    /// Static metadata reported by the informational endpoints
    pub gateway: GatewayInfo,
    /// Schema surface configuration
    pub graphql: GraphqlConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Upstream provider configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Full URL of the chat completions endpoint
    pub api_url: String,
    /// Bearer credential
    pub api_key: Secret<String>,
    /// Model used when a request does not name one
    pub default_model: String,
    /// System prompt used by the relay when a request does not supply one
    pub default_system_prompt: String,
}

/// Deployment metadata
#[derive(Debug, Clone)]
pub struct GatewayInfo {
    /// Service name
    pub name: String,
    /// Domain the gateway is served under
    pub domain: String,
}

/// Schema surface configuration
#[derive(Debug, Clone)]
pub struct GraphqlConfig {
    /// Replace resolver error details with a generic message
    pub mask_errors: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    /// * `ConfigError::Missing` if `UPSTREAM_API_KEY` is unset or empty
    /// * `ConfigError::Invalid` if `PORT` or `GRAPHQL_MASK_ERRORS` cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: format!("{}", e),
            })?,
            Err(_) => 8080,
        };

        let api_key = env::var("UPSTREAM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("UPSTREAM_API_KEY"))?;

        let mask_errors = match env::var("GRAPHQL_MASK_ERRORS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "GRAPHQL_MASK_ERRORS",
                reason: format!("expected true or false, got {:?}", raw),
            })?,
            Err(_) => true,
        };

        Ok(Self {
            server: ServerConfig {
                port,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            upstream: UpstreamConfig {
                api_url: env::var("UPSTREAM_API_URL")
                    .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),
                api_key: Secret::new(api_key),
                default_model: env::var("DEFAULT_MODEL")
                    .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                default_system_prompt: env::var("DEFAULT_SYSTEM_PROMPT")
                    .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
            },
            gateway: GatewayInfo {
                name: env::var("GATEWAY_NAME")
                    .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string()),
                domain: env::var("GATEWAY_DOMAIN").unwrap_or_else(|_| "localhost".to_string()),
            },
            graphql: GraphqlConfig { mask_errors },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "PORT",
        "UPSTREAM_API_KEY",
        "UPSTREAM_API_URL",
        "DEFAULT_MODEL",
        "GRAPHQL_MASK_ERRORS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_api_key() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("UPSTREAM_API_KEY")));

        env::set_var("UPSTREAM_API_KEY", "   ");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        env::set_var("UPSTREAM_API_KEY", "sk-test");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.api_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.upstream.default_model, DEFAULT_MODEL);
        assert!(config.graphql.mask_errors);
        assert!(config.server_addr().ends_with(":8080"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        clear_env();
        env::set_var("UPSTREAM_API_KEY", "sk-test");
        env::set_var("PORT", "eighty");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));
        clear_env();
    }
}
