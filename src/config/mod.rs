//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (deployment env overrides: MONGO_URI, PORT, CT_*, ...)
//!     → validation.rs (semantic checks)
//!     → loader.rs (read info / API descriptor JSON)
//!     → StartupContext (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Context is immutable once built; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod context;
pub mod loader;
pub mod schema;
pub mod validation;

pub use context::StartupContext;
pub use loader::{resolve_context, ConfigError};
pub use schema::{RegistrationMode, RunMode, ServiceConfig};
