//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs, stage.rs):
//!     Init → DbReady → ServicesStarted → Listening → Registered → Running
//!     any non-terminal stage → Failed
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Latched → Stop accepting → Drain connections → Teardown log → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup enforced by the stage machine, not by statement order
//! - Fail fast: any startup error is fatal
//! - Listener starts after the database and background services

pub mod shutdown;
pub mod signals;
pub mod stage;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal, Teardown};
pub use stage::Stage;
pub use startup::{Collaborators, Sequencer, StartupError};
