//! The frozen startup context.

use std::time::Duration;

use serde_json::Value;

use crate::config::schema::{
    ObservabilityConfig, QueueConfig, RegistrationMode, RunMode, ServiceConfig,
};

/// Resolved configuration, built once at process start and shared as
/// `Arc<StartupContext>`. Nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct StartupContext {
    pub service_name: String,
    pub local_url: String,
    pub bind_address: String,
    pub database_uri: String,
    pub discovery_url: Option<String>,
    pub discovery_token: Option<String>,
    pub registration_mode: RegistrationMode,
    pub run_mode: RunMode,
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub queues: QueueConfig,
    pub observability: ObservabilityConfig,
    /// Service info descriptor announced to the discovery service.
    pub info: Value,
    /// Public API descriptor.
    pub swagger: Value,
}

impl StartupContext {
    pub fn new(config: ServiceConfig, info: Value, swagger: Value) -> Self {
        Self {
            bind_address: config.listener.bind_address(),
            database_uri: config.database.connection_uri(),
            service_name: config.service.name,
            local_url: config.service.local_url,
            discovery_url: config.discovery.url,
            discovery_token: config.discovery.token,
            registration_mode: config.discovery.mode,
            run_mode: config.runtime.mode,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            max_body_size: config.security.max_body_size,
            queues: config.queues,
            observability: config.observability,
            info,
            swagger,
        }
    }

    /// Defaults with empty metadata, for tests and tooling.
    pub fn from_config(config: ServiceConfig) -> Self {
        Self::new(config, Value::Object(Default::default()), Value::Object(Default::default()))
    }
}
