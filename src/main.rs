//! Doc Orchestrator
//!
//! Brings the service up in a fixed order and keeps it serving.
//!
//! # Architecture Overview
//!
//! ```text
//!   config + env ──▶ StartupContext (immutable, Arc-shared)
//!                          │
//!                          ▼
//!   ┌───────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │ database  │──▶│ background  │──▶│ http server  │──▶│ registration │──▶ Running
//!   │   gate    │   │  services   │   │ (normalized) │   │   client     │
//!   └───────────┘   └─────────────┘   └──────────────┘   └──────────────┘
//!         │                                   │                  │
//!         └──────────── any failure ──────────┴──────────────────┴──▶ exit(1)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use doc_orchestrator::config::{resolve_context, schema::ObservabilityConfig};
use doc_orchestrator::database::MongoGate;
use doc_orchestrator::http::ServiceRoutes;
use doc_orchestrator::lifecycle::{signals, Collaborators, Sequencer, Shutdown, StartupError, Teardown};
use doc_orchestrator::observability::{logging, metrics};
use doc_orchestrator::registration::HttpRegistrar;
use doc_orchestrator::services;

#[derive(Parser)]
#[command(name = "doc-orchestrator")]
#[command(about = "Document orchestration microservice", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, env = "DOC_ORCHESTRATOR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let teardown = Teardown::new();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(code) => code,
    };

    teardown.finish(exit_code);
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<(), i32> {
    let ctx = match resolve_context(cli.config.as_deref(), |key| std::env::var(key).ok()) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Configuration error");
            return Err(1);
        }
    };

    logging::init_logging(&ctx.observability);
    tracing::info!(
        service = %ctx.service_name,
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %ctx.bind_address,
        registration_mode = ?ctx.registration_mode,
        run_mode = ?ctx.run_mode,
        "Configuration loaded"
    );

    if ctx.observability.metrics_enabled {
        if let Ok(addr) = ctx.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %ctx.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let collaborators = Collaborators {
        database: Arc::new(MongoGate::new()),
        services: services::default_services(&ctx),
        routes: Arc::new(ServiceRoutes::new()),
        registrar: Arc::new(HttpRegistrar::default()),
    };

    let mut sequencer = Sequencer::new(ctx, collaborators);
    match sequencer.run(&shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Err(StartupError::Interrupted { .. }) => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
        // Already logged by the sequencer when it entered the failed stage.
        Err(e) => Err(e.exit_code()),
    }
}
