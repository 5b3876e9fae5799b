//! Registration descriptor.

use serde::Serialize;
use serde_json::Value;

use crate::config::{RegistrationMode, StartupContext};

/// Tag identifying the HTTP framework to the discovery service.
pub const FRAMEWORK_TAG: &str = "axum";

/// Identity and metadata announced for this instance. Built once, never
/// mutated.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDescriptor {
    pub name: String,
    pub info: Value,
    pub swagger: Value,
    /// URL the discovery service forwards traffic to.
    pub url: String,
    pub discovery_url: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub mode: RegistrationMode,
    pub framework: &'static str,
    pub active: bool,
}

impl RegistrationDescriptor {
    pub fn from_context(ctx: &StartupContext) -> Self {
        Self {
            name: ctx.service_name.clone(),
            info: ctx.info.clone(),
            swagger: ctx.swagger.clone(),
            url: ctx.local_url.clone(),
            discovery_url: ctx.discovery_url.clone(),
            token: ctx.discovery_token.clone(),
            mode: ctx.registration_mode,
            framework: FRAMEWORK_TAG,
            active: true,
        }
    }
}
