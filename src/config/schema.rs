//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identity.
    pub service: IdentityConfig,

    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Storage connection settings.
    pub database: DatabaseConfig,

    /// Discovery service registration settings.
    pub discovery: DiscoveryConfig,

    /// Run mode (production vs. anything else).
    pub runtime: RuntimeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Background queue consumers.
    pub queues: QueueConfig,
}

/// Service identity as announced to the discovery service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Service name.
    pub name: String,

    /// URL other services use to reach this instance.
    pub local_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "doc-orchestrator".to_string(),
            local_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Listening port. Must be non-zero in a validated config.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Storage connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URI. Takes precedence over host/port/database.
    pub uri: Option<String>,

    /// Database host.
    pub host: String,

    /// Database port.
    pub port: u16,

    /// Database name.
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            host: "localhost".to_string(),
            port: 27017,
            database: "doc-orchestrator".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection URI: explicit override first, otherwise
    /// composed from host, port and database.
    pub fn connection_uri(&self) -> String {
        match &self.uri {
            Some(uri) if !uri.trim().is_empty() => uri.clone(),
            _ => format!("mongodb://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

/// How the instance announces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationMode {
    /// The instance pushes its own registration on startup.
    Auto,
    /// The discovery service pulls `/info`; nothing is pushed.
    #[default]
    Normal,
}

impl RegistrationMode {
    /// Parse the deployment flag. Only `auto` selects auto-registration.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "auto" {
            RegistrationMode::Auto
        } else {
            RegistrationMode::Normal
        }
    }
}

/// Discovery service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Discovery service base URL.
    pub url: Option<String>,

    /// Bearer token for the discovery service.
    pub token: Option<String>,

    /// Registration mode.
    pub mode: RegistrationMode,

    /// Path to the service info descriptor (JSON).
    pub info_path: String,

    /// Path to the public API descriptor (JSON).
    pub swagger_path: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            mode: RegistrationMode::Normal,
            info_path: "microservice/register.json".to_string(),
            swagger_path: "microservice/public-swagger.json".to_string(),
        }
    }
}

/// Run mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    #[default]
    Development,
}

impl RunMode {
    /// Parse the environment name; `prod` and `production` are production.
    pub fn from_env_name(name: &str) -> Self {
        match name.trim() {
            "prod" | "production" => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub mode: RunMode,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

/// Queue names consumed by the background services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    pub tasks: String,
    pub status: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            tasks: "doc-tasks".to_string(),
            status: "doc-status".to_string(),
        }
    }
}
