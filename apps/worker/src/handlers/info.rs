// [apps/worker/src/handlers/info.rs]
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::hardware;
use crate::state::WorkerState;

/// Static identity/pricing, live `*_available` fields — the contract is
/// `original_source/zakuro/worker/server.py`'s `/info` response shape.
pub async fn info(State(state): State<WorkerState>) -> Json<Value> {
    let cpus_total = num_cpus::get() as f64;
    let memory_total_bytes = hardware::total_memory_bytes();
    let load = hardware::sample_current_load(cpus_total, memory_total_bytes);

    Json(json!({
        "name": state.config.resolved_name(),
        "worker_type": state.config.worker_type,
        "version": env!("CARGO_PKG_VERSION"),
        "resources": {
            "cpus_total": cpus_total,
            "cpus_available": load.cpus_available,
            "memory_total": memory_total_bytes,
            "memory_available": load.memory_available_bytes,
            "gpus_total": 0,
            "gpus_available": 0,
        },
        "hardware": {
            "cpu_model": Value::Null,
            "gpu_model": Value::Null,
            "gpu_vram_gb": Value::Null,
            "storage_gb": Value::Null,
        },
        "pricing": {
            "cpu_price": state.config.cpu_price,
            "memory_price": state.config.memory_price,
            "gpu_price": state.config.gpu_price,
            "min_charge": state.config.min_charge,
        },
        "tags": state.config.tags(),
    }))
}
