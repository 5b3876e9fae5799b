//! Error normalization middleware.
//! Outermost layer: every raised error leaves as a JSON-API error envelope.

use std::any::Any;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RunMode;
use crate::http::error::{NormalizedError, RaisedError};
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

pub async fn error_normalization_middleware(
    State(run_mode): State<RunMode>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    // No raised error: the response passes through untouched.
    let Some(raised) = response.extensions_mut().remove::<RaisedError>() else {
        return response;
    };

    let request_id = response
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let interpreted = raised.interpret();
    if interpreted.decode_failed {
        tracing::debug!(request_id = %request_id, "Raised error is not a structured payload, using raw value");
    }

    let normalized = NormalizedError::resolve(&interpreted, raised.response_status(), run_mode);

    tracing::error!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = normalized.status,
        error = %interpreted.message,
        "Request failed"
    );
    metrics::record_normalized_error(normalized.status);

    let mut normalized_response = normalized.into_response();
    if let Some(id) = response.headers().get(X_REQUEST_ID) {
        normalized_response.headers_mut().insert(X_REQUEST_ID, id.clone());
    }
    normalized_response
}

/// `CatchPanicLayer` hook: a panicking handler becomes an opaque raised
/// error so it is normalized like any other.
pub fn panic_to_raised_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    RaisedError::opaque(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_panic_payloads() {
        let response = panic_to_raised_error(Box::new("static str"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<RaisedError>(),
            Some(&RaisedError::opaque("static str"))
        );

        let response = panic_to_raised_error(Box::new(String::from("owned")));
        assert_eq!(
            response.extensions().get::<RaisedError>(),
            Some(&RaisedError::opaque("owned"))
        );

        let response = panic_to_raised_error(Box::new(7u8));
        assert_eq!(
            response.extensions().get::<RaisedError>(),
            Some(&RaisedError::opaque("handler panicked"))
        );
    }
}
