//! Shared utilities for integration tests: recording collaborators and a
//! stub discovery service.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use doc_orchestrator::config::{ServiceConfig, StartupContext};
use doc_orchestrator::database::{DatabaseError, DatabaseGate};
use doc_orchestrator::http::RouteLoader;
use doc_orchestrator::registration::{RegistrationDescriptor, RegistrationError, Registrar};
use doc_orchestrator::services::{BackgroundService, ServiceContext, ServiceError};
use doc_orchestrator::{Collaborators, Shutdown};

/// Ordered record of collaborator calls across the whole sequence.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Defaults bound to an ephemeral loopback port.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_host = "127.0.0.1".into();
    config.listener.port = 0;
    config
}

pub fn test_context(config: ServiceConfig) -> Arc<StartupContext> {
    Arc::new(StartupContext::from_config(config))
}

pub fn no_proxy_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub struct MockGate {
    log: EventLog,
    fail: bool,
    pub disconnects: AtomicUsize,
}

impl MockGate {
    pub fn new(log: &EventLog, fail: bool) -> Self {
        Self {
            log: log.clone(),
            fail,
            disconnects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DatabaseGate for MockGate {
    async fn connect(&self, _uri: &str) -> Result<(), DatabaseError> {
        self.log.lock().unwrap().push("db".into());
        if self.fail {
            Err(DatabaseError::Connect("connection refused".into()))
        } else {
            Ok(())
        }
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RecordingService {
    name: String,
    log: EventLog,
    fail: bool,
}

impl RecordingService {
    pub fn new(name: &str, log: &EventLog, fail: bool) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            fail,
        }
    }
}

impl BackgroundService for RecordingService {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, _ctx: ServiceContext) -> Result<(), ServiceError> {
        self.log.lock().unwrap().push(self.name.clone());
        if self.fail {
            Err(ServiceError::Start {
                name: self.name.clone(),
                reason: "broker unreachable".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Service whose start stands in for a stop signal arriving mid-startup.
pub struct StoppingService {
    shutdown: Shutdown,
}

impl StoppingService {
    pub fn new(shutdown: &Shutdown) -> Self {
        Self {
            shutdown: shutdown.clone(),
        }
    }
}

impl BackgroundService for StoppingService {
    fn name(&self) -> &str {
        "stopper"
    }

    fn start(&self, _ctx: ServiceContext) -> Result<(), ServiceError> {
        self.shutdown.trigger();
        Ok(())
    }
}

pub struct RecordingRoutes {
    log: EventLog,
}

impl RecordingRoutes {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl RouteLoader for RecordingRoutes {
    fn load_routes(&self, router: Router) -> Router {
        self.log.lock().unwrap().push("routes".into());
        router.route("/hello", get(|| async { "hello" }))
    }
}

/// Registrar that proves the server answers before accepting the
/// registration.
pub struct PingingRegistrar {
    log: EventLog,
    fail: bool,
    pub seen: Mutex<Vec<SocketAddr>>,
}

impl PingingRegistrar {
    pub fn new(log: &EventLog, fail: bool) -> Self {
        Self {
            log: log.clone(),
            fail,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Registrar for PingingRegistrar {
    async fn register(
        &self,
        _descriptor: &RegistrationDescriptor,
        local_addr: SocketAddr,
    ) -> Result<(), RegistrationError> {
        self.log.lock().unwrap().push("register".into());
        self.seen.lock().unwrap().push(local_addr);

        let pong = no_proxy_client()
            .get(format!("http://{}/ping", local_addr))
            .send()
            .await
            .map_err(|e| RegistrationError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| RegistrationError::Transport(e.to_string()))?;
        assert_eq!(pong, "pong", "server must be live before registration");

        if self.fail {
            Err(RegistrationError::Rejected {
                status: 401,
                body: "bad token".into(),
            })
        } else {
            Ok(())
        }
    }
}

pub struct Harness {
    pub log: EventLog,
    pub gate: Arc<MockGate>,
    pub registrar: Arc<PingingRegistrar>,
}

impl Harness {
    pub fn new(db_fails: bool, registration_fails: bool) -> Self {
        let log = event_log();
        Self {
            gate: Arc::new(MockGate::new(&log, db_fails)),
            registrar: Arc::new(PingingRegistrar::new(&log, registration_fails)),
            log,
        }
    }

    pub fn collaborators(&self, failing_services: &[&str]) -> Collaborators {
        let services = ["tasks-queue", "status-queue"]
            .iter()
            .map(|name| {
                Arc::new(RecordingService::new(name, &self.log, failing_services.contains(name)))
                    as Arc<dyn BackgroundService>
            })
            .collect();
        Collaborators {
            database: self.gate.clone(),
            services,
            routes: Arc::new(RecordingRoutes::new(&self.log)),
            registrar: self.registrar.clone(),
        }
    }
}

/// A captured registration request: authorization header and JSON body.
pub type CapturedRequest = (Option<String>, Value);

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Stub discovery service answering every registration with `status`.
pub struct DiscoveryStub {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl DiscoveryStub {
    pub async fn start(status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/api/v1/microservice", post(register_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn register_handler(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push((auth, body));
    state.status
}

/// Poll until `addr` refuses connections.
pub async fn wait_until_closed(addr: SocketAddr) -> bool {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_err() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
