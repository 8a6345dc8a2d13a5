// [libs/domain/models/src/worker.rs]
use serde::{Deserialize, Serialize};

/// Resource capacity, total vs. currently available.
///
/// Invariant: `available <= total` on every dimension, enforced by the
/// registry writer, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub cpus_total: f64,
    pub cpus_available: f64,
    pub memory_total_bytes: u64,
    pub memory_available_bytes: u64,
    pub gpus_total: u32,
    pub gpus_available: u32,
}

/// Per-unit pricing, in credits (fixed-point handled at the ledger layer;
/// here prices are plain decimals since they are small, human-authored
/// configuration values rather than accounting state).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub cpu_price_per_sec: f64,
    pub memory_price_per_gib_sec: f64,
    pub gpu_price_per_sec: f64,
    pub min_charge: f64,
}

impl Pricing {
    /// `cost = max(min_charge, cpus*cpu_price*d + (mem_bytes/GiB)*mem_price*d + gpus*gpu_price*d)`
    pub fn project_cost(&self, cpus: f64, memory_bytes: u64, gpus: u32, duration_secs: f64) -> f64 {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        let memory_gib = memory_bytes as f64 / GIB;
        let raw = cpus * self.cpu_price_per_sec * duration_secs
            + memory_gib * self.memory_price_per_gib_sec * duration_secs
            + gpus as f64 * self.gpu_price_per_sec * duration_secs;
        raw.max(self.min_charge)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    pub cpu_model: Option<String>,
    pub gpu_model: Option<String>,
    pub gpu_vram_gb: Option<f64>,
    pub storage_gb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    Healthy,
    Unhealthy,
    Draining,
}

impl WorkerStatus {
    pub fn is_eligible(&self) -> bool {
        matches!(self, WorkerStatus::Healthy)
    }
}

/// Identity, capacity, pricing and health for one worker as known to the
/// registry. `last_seen_ms` and `ewma_latency_ms` are updated on every
/// discovery probe; `in_flight` is a hint, not authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub name: String,
    pub endpoint: String,
    pub worker_type: String,
    pub resources: Resources,
    pub pricing: Pricing,
    pub tags: Vec<String>,
    pub hardware: HardwareDescriptor,
    pub status: WorkerStatus,
    pub last_seen_ms: i64,
    pub ewma_latency_ms: f64,
    pub in_flight: u32,
    pub consecutive_probe_failures: u32,
}

impl WorkerRecord {
    pub fn is_selectable(&self) -> bool {
        self.status.is_eligible() && (self.in_flight as f64) < self.resources.cpus_total
    }
}
