// [apps/worker/src/handlers/health.rs]
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn banner() -> Json<Value> {
    Json(json!({ "service": "zakuro-worker", "status": "running" }))
}
