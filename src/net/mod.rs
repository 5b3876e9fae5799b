//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! StartupContext.bind_address
//!     → listener.rs (resolve + bind)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - A bind failure is fatal; there is no retry
//! - The bound address is reported back so callers see the real port

pub mod listener;

pub use listener::{bind, ListenerError};
