//! Discovery service client.
//!
//! # Responsibilities
//! - Announce the live instance in auto mode
//! - Report every failure as a typed error; the caller decides it is fatal

use std::net::SocketAddr;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use thiserror::Error;

use crate::config::RegistrationMode;
use crate::observability::metrics;
use crate::registration::descriptor::RegistrationDescriptor;

/// Discovery service endpoint that accepts registrations.
pub const REGISTRATION_PATH: &str = "/api/v1/microservice";

/// Errors that can occur while registering.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Auto mode without a discovery URL.
    #[error("discovery service url is not configured")]
    MissingDiscoveryUrl,

    /// The request never produced a response.
    #[error("registration request failed: {0}")]
    Transport(String),

    /// The discovery service answered with a non-success status.
    #[error("registration rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Announces a running instance to the discovery service.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Called once the listener at `local_addr` is accepting connections.
    async fn register(
        &self,
        descriptor: &RegistrationDescriptor,
        local_addr: SocketAddr,
    ) -> Result<(), RegistrationError>;
}

#[derive(Serialize)]
struct RegistrationRequest<'a> {
    name: &'a str,
    url: &'a str,
    active: bool,
}

/// Registrar speaking the discovery service's HTTP API.
#[derive(Clone, Default)]
pub struct HttpRegistrar {
    client: reqwest::Client,
}

impl HttpRegistrar {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn announce(&self, descriptor: &RegistrationDescriptor) -> Result<(), RegistrationError> {
        let base = descriptor
            .discovery_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(RegistrationError::MissingDiscoveryUrl)?;
        let endpoint = format!("{}{}", base.trim_end_matches('/'), REGISTRATION_PATH);

        let mut request = self.client.post(&endpoint).json(&RegistrationRequest {
            name: &descriptor.name,
            url: &descriptor.url,
            active: descriptor.active,
        });
        if let Some(token) = descriptor.token.as_deref() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RegistrationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(endpoint = %endpoint, "Registered with discovery service");
        Ok(())
    }
}

#[async_trait]
impl Registrar for HttpRegistrar {
    async fn register(
        &self,
        descriptor: &RegistrationDescriptor,
        local_addr: SocketAddr,
    ) -> Result<(), RegistrationError> {
        tracing::info!(
            name = %descriptor.name,
            url = %descriptor.url,
            local_addr = %local_addr,
            mode = ?descriptor.mode,
            framework = descriptor.framework,
            "Registering instance"
        );

        let result = match descriptor.mode {
            RegistrationMode::Auto => self.announce(descriptor).await,
            // Pull mode: the discovery service reads /info on its own schedule.
            RegistrationMode::Normal => Ok(()),
        };

        metrics::record_registration(result.is_ok());
        result
    }
}
