//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the database gate
//! - Start the background services, in order, without waiting on them
//! - Bind the listener and start serving
//! - Register the live instance with the discovery service
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A stop requested before the listener binds ends startup cleanly
//! - Every step is a checked stage transition
//! - Listeners start last among local subsystems (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;

use crate::config::StartupContext;
use crate::database::{redact_uri, DatabaseError, DatabaseGate};
use crate::http::{HttpServer, RouteLoader, ServingHandle};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::stage::Stage;
use crate::net::{self, ListenerError};
use crate::observability::metrics;
use crate::registration::{RegistrationDescriptor, RegistrationError, Registrar};
use crate::services::{BackgroundService, ServiceContext};

/// Fatal errors raised while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database gate failed: {0}")]
    Database(#[source] DatabaseError),

    #[error("{0}")]
    Bind(#[source] ListenerError),

    #[error("registration failed: {0}")]
    Registration(#[source] RegistrationError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("illegal stage transition {from} -> {to}")]
    IllegalTransition { from: Stage, to: Stage },

    #[error("shutdown requested during startup at {stage}")]
    Interrupted { stage: Stage },
}

impl StartupError {
    /// Process exit status. Zero only when startup was stopped on request.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Interrupted { .. } => 0,
            _ => 1,
        }
    }
}

/// External collaborators the sequencer drives.
pub struct Collaborators {
    pub database: Arc<dyn DatabaseGate>,
    /// Started in this order.
    pub services: Vec<Arc<dyn BackgroundService>>,
    pub routes: Arc<dyn RouteLoader>,
    pub registrar: Arc<dyn Registrar>,
}

/// Drives the bootstrap sequence through its stages.
pub struct Sequencer {
    ctx: Arc<StartupContext>,
    collaborators: Collaborators,
    stage: Stage,
    history: Vec<Stage>,
}

impl Sequencer {
    pub fn new(ctx: Arc<StartupContext>, collaborators: Collaborators) -> Self {
        Self {
            ctx,
            collaborators,
            stage: Stage::Init,
            history: vec![Stage::Init],
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    fn advance(&mut self, to: Stage) -> Result<(), StartupError> {
        if !self.stage.can_advance(to) {
            let from = self.stage;
            return Err(self.fail(StartupError::IllegalTransition { from, to }));
        }
        tracing::debug!(from = %self.stage, to = %to, "Startup stage transition");
        self.stage = to;
        self.history.push(to);
        metrics::record_startup_stage(to.ordinal());
        Ok(())
    }

    fn fail(&mut self, error: StartupError) -> StartupError {
        if self.stage.can_advance(Stage::Failed) {
            if let StartupError::Interrupted { .. } = error {
                tracing::warn!(stage = %self.stage, "Startup interrupted by shutdown request");
            } else {
                tracing::error!(stage = %self.stage, error = %error, "Startup failed");
            }
            self.stage = Stage::Failed;
            self.history.push(Stage::Failed);
            metrics::record_startup_stage(Stage::Failed.ordinal());
        }
        error
    }

    /// Fail once the gate is open; the connection is released first.
    async fn fail_and_disconnect(&mut self, error: StartupError) -> StartupError {
        let error = self.fail(error);
        self.collaborators.database.disconnect().await;
        error
    }

    /// Run the sequence up to `Running` and return the live server.
    pub async fn start(&mut self, shutdown: &Shutdown) -> Result<ServingHandle, StartupError> {
        let ctx = self.ctx.clone();
        let database = self.collaborators.database.clone();
        let services = self.collaborators.services.clone();
        let routes = self.collaborators.routes.clone();
        let registrar = self.collaborators.registrar.clone();

        // Database gate, abandoned if a stop arrives while connecting
        let mut stop = shutdown.subscribe();
        tracing::info!(uri = %redact_uri(&ctx.database_uri), "Connecting to database");
        let connected = tokio::select! {
            biased;
            _ = stop.recv() => None,
            result = database.connect(&ctx.database_uri) => Some(result),
        };
        match connected {
            Some(Ok(())) => {}
            Some(Err(e)) => return Err(self.fail(StartupError::Database(e))),
            None => return Err(self.fail(StartupError::Interrupted { stage: Stage::Init })),
        }
        self.advance(Stage::DbReady)?;

        // Background services: invoked once each, in order, never awaited
        tracing::info!(service = %ctx.service_name, "Initializing background services");
        for service in &services {
            let service_ctx = ServiceContext {
                startup: ctx.clone(),
                shutdown: shutdown.subscribe(),
            };
            match service.start(service_ctx) {
                Ok(()) => tracing::info!(service = service.name(), "Background service started"),
                Err(e) => tracing::warn!(service = service.name(), error = %e, "Background service failed to start"),
            }
        }
        self.advance(Stage::ServicesStarted)?;

        // HTTP listener
        if stop.is_triggered() {
            let stage = self.stage;
            return Err(self.fail_and_disconnect(StartupError::Interrupted { stage }).await);
        }
        let server = HttpServer::new(&ctx, routes.as_ref());
        let listener = match net::bind(&ctx.bind_address).await {
            Ok(listener) => listener,
            Err(e) => return Err(self.fail_and_disconnect(StartupError::Bind(e)).await),
        };
        let handle = match server.spawn(listener, shutdown.subscribe()) {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail_and_disconnect(StartupError::Serve(e)).await),
        };
        self.advance(Stage::Listening)?;
        tracing::info!(address = %handle.local_addr(), "Server started");

        // Registration
        let descriptor = RegistrationDescriptor::from_context(&ctx);
        if let Err(e) = registrar.register(&descriptor, handle.local_addr()).await {
            handle.abort();
            return Err(self.fail_and_disconnect(StartupError::Registration(e)).await);
        }
        self.advance(Stage::Registered)?;

        self.advance(Stage::Running)?;
        Ok(handle)
    }

    /// Start, then serve until shutdown.
    pub async fn run(&mut self, shutdown: &Shutdown) -> Result<(), StartupError> {
        let handle = self.start(shutdown).await?;
        let served = handle.wait().await;
        self.collaborators.database.disconnect().await;
        served.map_err(|e| self.fail(StartupError::Serve(e)))
    }
}
