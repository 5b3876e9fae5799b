//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the supplied route table
//! - Mount the discovery pull endpoints
//! - Wire up middleware (normalization, request ID, tracing, limits)
//! - Serve on an already bound listener until shutdown

use std::net::SocketAddr;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::StartupContext;
use crate::http::middleware::{error_normalization_middleware, panic_to_raised_error};
use crate::http::routes::RouteLoader;
use crate::lifecycle::ShutdownSignal;
use crate::registration::discovery_routes;

/// HTTP server for the orchestrator.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the application. The route loader is invoked exactly once, here.
    pub fn new(ctx: &StartupContext, loader: &dyn RouteLoader) -> Self {
        let router = Self::build_router(ctx, loader);
        Self { router }
    }

    /// Build the Axum router with all middleware layers. The last layer
    /// added is the outermost.
    #[allow(deprecated)]
    fn build_router(ctx: &StartupContext, loader: &dyn RouteLoader) -> Router {
        loader
            .load_routes(Router::new())
            .merge(discovery_routes(&ctx.info, &ctx.swagger))
            .layer(CatchPanicLayer::custom(panic_to_raised_error))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(ctx.max_body_size))
            .layer(TimeoutLayer::new(ctx.request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(middleware::from_fn_with_state(
                ctx.run_mode,
                error_normalization_middleware,
            ))
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Start serving on `listener` in a background task and return once the
    /// task is running. The listener is already bound, so connections made
    /// from here on are accepted.
    pub fn spawn(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<ServingHandle, std::io::Error> {
        let local_addr = listener.local_addr()?;
        tracing::info!(address = %local_addr, "HTTP server starting");

        let task = tokio::spawn(async move {
            axum::serve(listener, self.router)
                .with_graceful_shutdown(async move {
                    shutdown.recv().await;
                    tracing::info!("HTTP server received shutdown signal");
                })
                .await?;
            tracing::info!("HTTP server stopped");
            Ok::<(), std::io::Error>(())
        });

        Ok(ServingHandle { local_addr, task })
    }
}

/// A running server task.
pub struct ServingHandle {
    local_addr: SocketAddr,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl ServingHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server to stop.
    pub async fn wait(self) -> Result<(), std::io::Error> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }

    /// Stop serving immediately.
    pub fn abort(&self) {
        self.task.abort();
    }
}
