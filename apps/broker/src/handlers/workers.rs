// [apps/broker/src/handlers/workers.rs]
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn list_workers(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.registry.snapshot();
    let workers: Vec<Value> = snapshot
        .iter()
        .map(|w| {
            json!({
                "name": w.name,
                "endpoint": w.endpoint,
                "worker_type": w.worker_type,
                "price_per_cpu_sec": w.pricing.cpu_price_per_sec,
                "status": match w.status {
                    zakuro_models::worker::WorkerStatus::Healthy => "healthy",
                    zakuro_models::worker::WorkerStatus::Unhealthy => "unhealthy",
                    zakuro_models::worker::WorkerStatus::Draining => "draining",
                },
                "cpus_total": w.resources.cpus_total,
                "cpus_available": w.resources.cpus_available,
                "ewma_latency_ms": w.ewma_latency_ms,
                "in_flight": w.in_flight,
                "tags": w.tags,
            })
        })
        .collect();

    Json(json!({ "total": workers.len(), "workers": workers }))
}
