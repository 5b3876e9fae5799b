//! Queue consumer service.
//!
//! # Responsibilities
//! - Own the consumer task for one named queue
//! - Stop when the shutdown signal fires
//!
//! Message handling itself is plugged in by the queue integration and is
//! not part of this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time;

use crate::observability::metrics;
use crate::services::{BackgroundService, ServiceContext, ServiceError};

const IDLE_INTERVAL: Duration = Duration::from_secs(30);

pub struct QueueConsumer {
    name: String,
    queue: String,
    started: AtomicBool,
}

impl QueueConsumer {
    pub fn new(name: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: queue.into(),
            started: AtomicBool::new(false),
        }
    }

    fn fail(&self, reason: &str) -> ServiceError {
        ServiceError::Start {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl BackgroundService for QueueConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, ctx: ServiceContext) -> Result<(), ServiceError> {
        if self.queue.trim().is_empty() {
            return Err(self.fail("queue name is empty"));
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(self.fail("already started"));
        }

        let queue = self.queue.clone();
        let mut shutdown = ctx.shutdown;
        tokio::spawn(async move {
            tracing::info!(queue = %queue, "Queue consumer started");
            metrics::record_consumer_up(&queue, true);

            let mut ticker = time::interval(IDLE_INTERVAL);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tracing::trace!(queue = %queue, "Queue consumer idle");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!(queue = %queue, "Queue consumer received shutdown signal");
                        break;
                    }
                }
            }

            metrics::record_consumer_up(&queue, false);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::{ServiceConfig, StartupContext};
    use crate::lifecycle::Shutdown;

    fn ctx(shutdown: &Shutdown) -> ServiceContext {
        ServiceContext {
            startup: Arc::new(StartupContext::from_config(ServiceConfig::default())),
            shutdown: shutdown.subscribe(),
        }
    }

    #[tokio::test]
    async fn test_start_only_once() {
        let shutdown = Shutdown::new();
        let consumer = QueueConsumer::new("tasks-queue", "doc-tasks");

        assert!(consumer.start(ctx(&shutdown)).is_ok());
        let err = consumer.start(ctx(&shutdown)).unwrap_err();
        assert!(err.to_string().contains("already started"));

        shutdown.trigger();
    }

    #[tokio::test]
    async fn test_empty_queue_rejected() {
        let shutdown = Shutdown::new();
        let consumer = QueueConsumer::new("status-queue", "");
        assert!(consumer.start(ctx(&shutdown)).is_err());
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let consumer = QueueConsumer::new("tasks-queue", "doc-tasks");
        consumer.start(ctx(&shutdown)).unwrap();

        // Let the task subscribe-loop begin, then signal.
        tokio::task::yield_now().await;
        assert_eq!(shutdown.receiver_count(), 1);
        shutdown.trigger();

        for _ in 0..50 {
            if shutdown.receiver_count() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("consumer did not exit after shutdown");
    }
}
