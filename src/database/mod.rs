//! Storage connection gate.
//!
//! # Data Flow
//! ```text
//! StartupContext.database_uri
//!     → gate.rs (single connection attempt + ping)
//!     → Ok: startup continues
//!     → Err: logged with redacted URI, fatal to startup
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt; retry is the driver's own concern
//! - The gate owns the client for the lifetime of the process

pub mod gate;

pub use gate::{redact_uri, DatabaseError, DatabaseGate, MongoGate};
