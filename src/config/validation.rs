//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port, non-empty identity)
//! - Check URLs the service will dial or announce
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is frozen into the startup context

use thiserror::Error;
use url::Url;

use crate::config::schema::{RegistrationMode, ServiceConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service.name must not be empty")]
    EmptyServiceName,

    #[error("listener.bind_host must not be empty")]
    EmptyBindHost,

    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{0} is required when discovery.mode is auto")]
    MissingDiscoverySetting(&'static str),

    #[error("database uri must use the mongodb:// or mongodb+srv:// scheme, got '{0}'")]
    UnsupportedDatabaseScheme(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }
    if config.listener.bind_host.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if let Err(e) = Url::parse(&config.service.local_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "service.local_url",
            reason: e.to_string(),
        });
    }

    let uri = config.database.connection_uri();
    if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
        errors.push(ValidationError::UnsupportedDatabaseScheme(scheme_of(&uri)));
    }

    if config.discovery.mode == RegistrationMode::Auto {
        match config.discovery.url.as_deref() {
            None | Some("") => errors.push(ValidationError::MissingDiscoverySetting("discovery.url")),
            Some(url) => {
                if let Err(e) = Url::parse(url) {
                    errors.push(ValidationError::InvalidUrl {
                        field: "discovery.url",
                        reason: e.to_string(),
                    });
                }
            }
        }
        if config.discovery.token.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::MissingDiscoverySetting("discovery.token"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Never echo the whole URI back: it may carry credentials.
fn scheme_of(uri: &str) -> String {
    uri.split("://").next().unwrap_or_default().to_string()
}
