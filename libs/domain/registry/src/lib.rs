// [libs/domain/registry/src/lib.rs]
//! The live worker set. Snapshot reads copy the record list under a
//! short-held lock so selection never blocks the discovery writer; the
//! discovery loop is the only writer.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::{info, warn};
use zakuro_models::worker::{HardwareDescriptor, Pricing, Resources, WorkerRecord, WorkerStatus};

/// Consecutive `/info` failures before a worker is marked unhealthy.
pub const UNHEALTHY_THRESHOLD: u32 = 3;
/// Consecutive `/info` failures before a worker is removed outright.
pub const REMOVE_THRESHOLD: u32 = 20;
/// EWMA smoothing factor for `/info` round-trip latency.
pub const EWMA_ALPHA: f64 = 0.3;

/// Data extracted from a successful `/info` probe response.
#[derive(Debug, Clone)]
pub struct ProbeSample {
    pub name: String,
    pub worker_type: String,
    pub resources: Resources,
    pub pricing: Pricing,
    pub tags: Vec<String>,
    pub hardware: HardwareDescriptor,
    pub rtt_ms: f64,
}

pub struct WorkerRegistry {
    workers: RwLock<HashMap<String, WorkerRecord>>,
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
        }
    }

    /// Called by the discovery loop on a successful `/info` probe.
    pub fn upsert_from_probe(&self, endpoint: &str, sample: ProbeSample) {
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        let now = Utc::now().timestamp_millis();

        let entry = workers.entry(endpoint.to_string()).or_insert_with(|| WorkerRecord {
            name: sample.name.clone(),
            endpoint: endpoint.to_string(),
            worker_type: sample.worker_type.clone(),
            resources: sample.resources,
            pricing: sample.pricing,
            tags: sample.tags.clone(),
            hardware: sample.hardware.clone(),
            status: WorkerStatus::Healthy,
            last_seen_ms: now,
            ewma_latency_ms: sample.rtt_ms,
            in_flight: 0,
            consecutive_probe_failures: 0,
        });

        let was_unhealthy = !matches!(entry.status, WorkerStatus::Healthy);
        entry.name = sample.name;
        entry.worker_type = sample.worker_type;
        entry.resources = sample.resources;
        entry.pricing = sample.pricing;
        entry.tags = sample.tags;
        entry.hardware = sample.hardware;
        entry.status = WorkerStatus::Healthy;
        entry.last_seen_ms = now;
        entry.consecutive_probe_failures = 0;
        entry.ewma_latency_ms =
            EWMA_ALPHA * sample.rtt_ms + (1.0 - EWMA_ALPHA) * entry.ewma_latency_ms;

        if was_unhealthy {
            info!(endpoint, "worker recovered, marked healthy");
        }
    }

    /// Called by the discovery loop on a failed `/info` probe.
    pub fn mark_probe_failure(&self, endpoint: &str) {
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        let Some(record) = workers.get_mut(endpoint) else {
            return;
        };
        record.consecutive_probe_failures += 1;

        if record.consecutive_probe_failures >= REMOVE_THRESHOLD {
            workers.remove(endpoint);
            warn!(endpoint, "worker removed after repeated probe failures");
            return;
        }

        if record.consecutive_probe_failures >= UNHEALTHY_THRESHOLD {
            record.status = WorkerStatus::Unhealthy;
            warn!(endpoint, "worker marked unhealthy");
        }
    }

    /// Called by the broker when a forwarded `/execute` call fails at the
    /// transport level (connect/timeout), independent of the probe cadence.
    pub fn mark_unhealthy(&self, endpoint: &str) {
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        if let Some(record) = workers.get_mut(endpoint) {
            record.status = WorkerStatus::Unhealthy;
        }
    }

    pub fn remove_expired(&self, expire_after_ms: i64) -> usize {
        let now = Utc::now().timestamp_millis();
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        let before = workers.len();
        workers.retain(|_, record| now - record.last_seen_ms <= expire_after_ms);
        before - workers.len()
    }

    pub fn increment_in_flight(&self, endpoint: &str) {
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        if let Some(record) = workers.get_mut(endpoint) {
            record.in_flight += 1;
        }
    }

    pub fn decrement_in_flight(&self, endpoint: &str) {
        let mut workers = self.workers.write().expect("LOCK_POISONED");
        if let Some(record) = workers.get_mut(endpoint) {
            record.in_flight = record.in_flight.saturating_sub(1);
        }
    }

    /// Consistent for the duration of a selection; safe to iterate freely.
    pub fn snapshot(&self) -> Vec<WorkerRecord> {
        self.workers
            .read()
            .expect("LOCK_POISONED")
            .values()
            .cloned()
            .collect()
    }

    pub fn get(&self, endpoint: &str) -> Option<WorkerRecord> {
        self.workers.read().expect("LOCK_POISONED").get(endpoint).cloned()
    }

    pub fn is_healthy(&self, endpoint: &str) -> bool {
        self.get(endpoint)
            .map(|w| matches!(w.status, WorkerStatus::Healthy))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.workers.read().expect("LOCK_POISONED").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProbeSample {
        ProbeSample {
            name: "w1".into(),
            worker_type: "cpu".into(),
            resources: Resources {
                cpus_total: 4.0,
                cpus_available: 4.0,
                memory_total_bytes: 1 << 30,
                memory_available_bytes: 1 << 30,
                gpus_total: 0,
                gpus_available: 0,
            },
            pricing: Pricing {
                cpu_price_per_sec: 0.001,
                memory_price_per_gib_sec: 0.0001,
                gpu_price_per_sec: 0.01,
                min_charge: 0.0001,
            },
            tags: vec![],
            hardware: HardwareDescriptor::default(),
            rtt_ms: 10.0,
        }
    }

    #[test]
    fn three_consecutive_failures_mark_unhealthy() {
        let registry = WorkerRegistry::new();
        registry.upsert_from_probe("w1:9000", sample());
        for _ in 0..3 {
            registry.mark_probe_failure("w1:9000");
        }
        assert!(!registry.is_healthy("w1:9000"));
    }

    #[test]
    fn twenty_consecutive_failures_remove_worker() {
        let registry = WorkerRegistry::new();
        registry.upsert_from_probe("w1:9000", sample());
        for _ in 0..20 {
            registry.mark_probe_failure("w1:9000");
        }
        assert!(registry.get("w1:9000").is_none());
    }

    #[test]
    fn successful_probe_recovers_health() {
        let registry = WorkerRegistry::new();
        registry.upsert_from_probe("w1:9000", sample());
        registry.mark_probe_failure("w1:9000");
        registry.mark_probe_failure("w1:9000");
        registry.mark_probe_failure("w1:9000");
        assert!(!registry.is_healthy("w1:9000"));
        registry.upsert_from_probe("w1:9000", sample());
        assert!(registry.is_healthy("w1:9000"));
    }
}
