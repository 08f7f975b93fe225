//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the command gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// API surface settings.
    pub api: ApiConfig,

    /// Runtime web settings (token override, users). Hot reloadable.
    pub settings: WebSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Device entities served by the built-in command engine.
    pub entities: Vec<EntityConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// API surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Path prefix all commands live under.
    pub base_path: String,

    /// Maximum accepted request body size in bytes.
    pub max_input_bytes: usize,

    /// Pretty-print JSON responses.
    pub pretty_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/api".to_string(),
            max_input_bytes: 1024,
            pretty_json: true,
        }
    }
}

/// Settings read on every API call.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WebSettings {
    /// Treat every caller as admin, no token required.
    pub notoken_api: bool,

    /// Known API users and their tokens.
    pub users: Vec<UserConfig>,
}

/// An API user.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserConfig {
    pub username: String,

    /// Bearer token presented by this user.
    pub token: String,

    /// Grants admin privilege.
    #[serde(default)]
    pub admin: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A device entity with an initial value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EntityConfig {
    pub device: String,
    pub name: String,

    /// Initial value (any JSON-compatible value).
    #[serde(default)]
    pub value: serde_json::Value,

    /// Allow writes through the API (default: true).
    #[serde(default = "default_writable")]
    pub writable: bool,

    /// Writes require admin privilege.
    #[serde(default)]
    pub admin_only: bool,
}

fn default_writable() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.api.base_path, "/api");
        assert!(!config.settings.notoken_api);
    }

    #[test]
    fn test_full_config() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [settings]
            notoken_api = true

            [[settings.users]]
            username = "admin"
            token = "secret"
            admin = true

            [[entities]]
            device = "boiler"
            name = "temp"
            value = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert!(config.settings.notoken_api);
        assert!(config.settings.users[0].admin);
        assert_eq!(config.entities[0].value, serde_json::json!(50));
        assert!(config.entities[0].writable);
        assert!(!config.entities[0].admin_only);
    }
}
