//! Health endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe for orchestration and uptime checks.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
