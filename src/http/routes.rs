//! Route table supplied to the server.

use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Supplies the route table. Called exactly once, synchronously, while the
/// application is built and before the listener accepts connections.
pub trait RouteLoader: Send + Sync {
    fn load_routes(&self, router: Router) -> Router;
}

/// Routes bundled with the service binary.
pub struct ServiceRoutes {
    started: Instant,
}

impl ServiceRoutes {
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }
}

impl Default for ServiceRoutes {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    uptime_secs: u64,
}

async fn healthcheck(State(started): State<Instant>) -> Json<Health> {
    Json(Health {
        status: "ok",
        uptime_secs: started.elapsed().as_secs(),
    })
}

impl RouteLoader for ServiceRoutes {
    fn load_routes(&self, router: Router) -> Router {
        router.merge(
            Router::new()
                .route("/healthcheck", get(healthcheck))
                .with_state(self.started),
        )
    }
}
