//! Pull endpoints for the discovery service.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

/// `/info` answers with the service info, API descriptor embedded under
/// `swagger`; `/ping` answers `pong`.
pub fn discovery_routes(info: &Value, swagger: &Value) -> Router {
    let document = Arc::new(info_document(info, swagger));
    Router::new()
        .route("/info", get(info_handler))
        .route("/ping", get(|| async { "pong" }))
        .with_state(document)
}

async fn info_handler(State(document): State<Arc<Value>>) -> Json<Value> {
    Json(document.as_ref().clone())
}

fn info_document(info: &Value, swagger: &Value) -> Value {
    match info {
        Value::Object(map) => {
            let mut map = map.clone();
            map.insert("swagger".to_string(), swagger.clone());
            Value::Object(map)
        }
        other => json!({ "info": other, "swagger": swagger }),
    }
}
