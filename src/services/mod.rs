//! Background services started after the database gate opens.
//!
//! # Data Flow
//! ```text
//! Sequencer (DbReady)
//!     → tasks queue consumer .start()
//!     → status queue consumer .start()
//!     → Sequencer (ServicesStarted)
//! ```
//!
//! # Design Decisions
//! - `start` is synchronous and returns once the service has spawned its task
//! - The sequencer never waits for readiness
//! - A start failure is logged, never propagated

pub mod queue;

use std::sync::Arc;

use thiserror::Error;
use crate::config::StartupContext;
use crate::lifecycle::ShutdownSignal;

pub use queue::QueueConsumer;

/// Errors a service may report from its start entry point.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service {name} failed to start: {reason}")]
    Start { name: String, reason: String },
}

/// Everything a service receives when it is started.
pub struct ServiceContext {
    pub startup: Arc<StartupContext>,
    pub shutdown: ShutdownSignal,
}

/// An internal service with a fire-and-forget start entry point.
pub trait BackgroundService: Send + Sync {
    fn name(&self) -> &str;

    /// Spawn the service. Must not block on the service becoming ready.
    fn start(&self, ctx: ServiceContext) -> Result<(), ServiceError>;
}

/// The two bundled consumers, in the order they must be started.
pub fn default_services(ctx: &StartupContext) -> Vec<Arc<dyn BackgroundService>> {
    vec![
        Arc::new(QueueConsumer::new("tasks-queue", ctx.queues.tasks.clone())),
        Arc::new(QueueConsumer::new("status-queue", ctx.queues.status.clone())),
    ]
}
