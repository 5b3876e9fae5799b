//! Raised errors and their normalized wire form.
//!
//! Handlers return `Result<_, RaisedError>`. The error turns itself into a
//! placeholder response that carries the original value in its extensions;
//! the normalization middleware picks it up from there, so an error is
//! interpreted and logged in exactly one place.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::config::RunMode;

/// Media type of every error body.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Message served in production in place of internal 500 details.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error";

/// An error raised while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaisedError {
    /// Created at a trusted raise site with a known status.
    Structured { status: StatusCode, message: String },

    /// A value handed over by a less-trusted collaborator. It may hold a
    /// serialized `{status, message}` payload, or nothing parseable at all.
    Opaque {
        value: String,
        /// Status the response already carried when the error was raised.
        response_status: Option<StatusCode>,
    },
}

impl RaisedError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        RaisedError::Structured {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn opaque(value: impl Into<String>) -> Self {
        RaisedError::Opaque {
            value: value.into(),
            response_status: None,
        }
    }

    /// Record the status the response had at the raise site. Only affects
    /// opaque values; structured errors always carry their own status.
    pub fn with_response_status(self, status: StatusCode) -> Self {
        match self {
            RaisedError::Opaque { value, .. } => RaisedError::Opaque {
                value,
                response_status: Some(status),
            },
            structured => structured,
        }
    }

    pub fn response_status(&self) -> Option<StatusCode> {
        match self {
            RaisedError::Structured { status, .. } => Some(*status),
            RaisedError::Opaque { response_status, .. } => *response_status,
        }
    }

    /// Best-effort interpretation of the raised value.
    pub fn interpret(&self) -> Interpreted {
        match self {
            RaisedError::Structured { status, message } => Interpreted {
                status: Some(*status),
                message: message.clone(),
                decode_failed: false,
            },
            RaisedError::Opaque { value, .. } => match decode_payload(value) {
                Some(payload) => Interpreted {
                    status: payload.status,
                    message: payload.message.unwrap_or_default(),
                    decode_failed: false,
                },
                None => Interpreted {
                    status: None,
                    message: value.clone(),
                    decode_failed: true,
                },
            },
        }
    }
}

impl std::fmt::Display for RaisedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaisedError::Structured { status, message } => write!(f, "{} {}", status.as_u16(), message),
            RaisedError::Opaque { value, .. } => write!(f, "{}", value),
        }
    }
}

impl std::error::Error for RaisedError {}

impl IntoResponse for RaisedError {
    fn into_response(self) -> Response {
        let status = self
            .response_status()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Body::empty()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Result of interpreting a raised value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    pub status: Option<StatusCode>,
    pub message: String,
    /// The value was opaque and did not decode as a structured payload.
    pub decode_failed: bool,
}

struct ErrorPayload {
    status: Option<StatusCode>,
    message: Option<String>,
}

// Only a JSON object is a structured payload; bare numbers or strings that
// happen to parse as JSON are treated as opaque text. Fields of the wrong
// type are ignored one by one.
fn decode_payload(value: &str) -> Option<ErrorPayload> {
    let serde_json::Value::Object(fields) = serde_json::from_str::<serde_json::Value>(value).ok()? else {
        return None;
    };

    let status = fields
        .get("status")
        .and_then(serde_json::Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .and_then(|s| StatusCode::from_u16(s).ok());
    let message = fields
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    Some(ErrorPayload { status, message })
}

/// The `{status, message}` form every raised error leaves the service in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub status: u16,
    pub message: String,
}

impl NormalizedError {
    /// Resolve status and message for a raised error.
    ///
    /// Status: interpreted payload, else `response_status`, else 500.
    pub fn resolve(
        interpreted: &Interpreted,
        response_status: Option<StatusCode>,
        run_mode: RunMode,
    ) -> Self {
        let status = interpreted
            .status
            .or(response_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if run_mode.is_production() && status == StatusCode::INTERNAL_SERVER_ERROR {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else if interpreted.message.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            interpreted.message.clone()
        };

        Self {
            status: status.as_u16(),
            message,
        }
    }
}

impl IntoResponse for NormalizedError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_vec(&self).unwrap_or_default();
        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_API_CONTENT_TYPE),
        );
        response
    }
}
