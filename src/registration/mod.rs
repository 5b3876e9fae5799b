//! Self-registration with the discovery service.
//!
//! # Data Flow
//! ```text
//! StartupContext
//!     → descriptor.rs (RegistrationDescriptor, built once)
//!     → client.rs (Registrar: announce after the listener is live)
//!     → Ok: keep serving / Err: fatal, process exits non-zero
//!
//! routes.rs mounts /info and /ping so the discovery service can pull
//! the same metadata at any time.
//! ```
//!
//! # Design Decisions
//! - Fail fast: an unregistered instance must not keep running
//! - Normal mode pushes nothing; the discovery service pulls `/info`

pub mod client;
pub mod descriptor;
pub mod routes;

pub use client::{HttpRegistrar, RegistrationError, Registrar, REGISTRATION_PATH};
pub use descriptor::{RegistrationDescriptor, FRAMEWORK_TAG};
pub use routes::discovery_routes;
