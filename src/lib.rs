//! Doc Orchestrator bootstrap library.
//!
//! Startup sequencing, error normalization and discovery registration for
//! the document orchestration microservice.

pub mod config;
pub mod database;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod registration;
pub mod services;

pub use config::StartupContext;
pub use http::{HttpServer, RaisedError, RouteLoader};
pub use lifecycle::{Collaborators, Sequencer, Shutdown, Stage, StartupError, Teardown};
