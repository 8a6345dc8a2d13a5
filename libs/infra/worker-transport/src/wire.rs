// [libs/infra/worker-transport/src/wire.rs]
//! The worker's `/info` response shape, matching
//! `original_source/zakuro/worker/server.py` field-for-field so the
//! broker can talk to either a Rust or the original Python worker.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WireResources {
    pub cpus_total: f64,
    pub cpus_available: f64,
    pub memory_total: u64,
    pub memory_available: u64,
    #[serde(default)]
    pub gpus_total: u32,
    #[serde(default)]
    pub gpus_available: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireHardware {
    pub cpu_model: Option<String>,
    pub gpu_model: Option<String>,
    pub gpu_vram_gb: Option<f64>,
    pub storage_gb: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePricing {
    pub cpu_price: f64,
    pub memory_price: f64,
    #[serde(default)]
    pub gpu_price: f64,
    pub min_charge: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerInfoResponse {
    pub name: String,
    pub worker_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub resources: WireResources,
    #[serde(default)]
    pub hardware: WireHardware,
    pub pricing: WirePricing,
}
