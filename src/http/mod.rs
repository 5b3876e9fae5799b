//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → middleware/error_normalization.rs (outermost: raised error → JSON-API envelope)
//!     → request id (set + propagate)
//!     → TraceLayer (request logging)
//!     → timeout, body limit, panic capture
//!     → routes.rs (externally supplied route table) + discovery endpoints
//! ```

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{NormalizedError, RaisedError, JSON_API_CONTENT_TYPE, UNEXPECTED_ERROR_MESSAGE};
pub use routes::{RouteLoader, ServiceRoutes};
pub use server::{HttpServer, ServingHandle};

/// Request id header set on every request and echoed on every response.
pub const X_REQUEST_ID: &str = "x-request-id";
