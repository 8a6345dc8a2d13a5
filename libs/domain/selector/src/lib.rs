// [libs/domain/selector/src/lib.rs]
//! Pure worker selection: `select(reqs, strategy, snapshot) -> worker | None`.
//! No I/O, no locking beyond the round-robin cursor's own mutex.

use std::sync::Mutex;

use zakuro_models::requirements::{RequestRequirements, SelectionStrategy};
use zakuro_models::worker::WorkerRecord;

/// Broker-wide round-robin cursor. Tracks the endpoint of the last worker
/// served rather than a raw index: the next pick is the smallest endpoint
/// strictly greater than the last one (wrapping to the first), so a
/// worker dropping out of the filtered set mid-rotation shifts the cycle
/// instead of re-serving the previous pick or skipping one ahead. Advances
/// only when a selection is actually made, never per filtering attempt.
#[derive(Default)]
pub struct RoundRobinCounter(Mutex<Option<String>>);

impl RoundRobinCounter {
    pub fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// `candidates` must already be sorted by endpoint.
    fn select_next(&self, candidates: &[WorkerRecord]) -> WorkerRecord {
        let mut last = self.0.lock().expect("LOCK_POISONED");
        let chosen = match last.as_deref() {
            Some(endpoint) => candidates
                .iter()
                .find(|w| w.endpoint.as_str() > endpoint)
                .unwrap_or(&candidates[0]),
            None => &candidates[0],
        };
        *last = Some(chosen.endpoint.clone());
        chosen.clone()
    }
}

fn fits(worker: &WorkerRecord, reqs: &RequestRequirements) -> bool {
    worker.is_selectable()
        && worker.resources.cpus_available >= reqs.cpus
        && worker.resources.memory_available_bytes >= reqs.memory_bytes
        && worker.resources.gpus_available >= reqs.gpus
        && (reqs.tags.is_empty() || reqs.tags.iter().all(|t| worker.tags.contains(t)))
}

fn best_price(candidates: &[WorkerRecord], reqs: &RequestRequirements) -> WorkerRecord {
    candidates
        .iter()
        .min_by(|a, b| {
            let cost_a = a
                .pricing
                .project_cost(reqs.cpus, reqs.memory_bytes, reqs.gpus, reqs.estimated_duration_secs);
            let cost_b = b
                .pricing
                .project_cost(reqs.cpus, reqs.memory_bytes, reqs.gpus, reqs.estimated_duration_secs);
            cost_a
                .partial_cmp(&cost_b)
                .unwrap()
                .then(a.ewma_latency_ms.partial_cmp(&b.ewma_latency_ms).unwrap())
                .then(a.endpoint.cmp(&b.endpoint))
        })
        .cloned()
        .expect("candidates non-empty")
}

fn best_latency(candidates: &[WorkerRecord]) -> WorkerRecord {
    candidates
        .iter()
        .min_by(|a, b| {
            a.ewma_latency_ms
                .partial_cmp(&b.ewma_latency_ms)
                .unwrap()
                .then(
                    a.pricing
                        .cpu_price_per_sec
                        .partial_cmp(&b.pricing.cpu_price_per_sec)
                        .unwrap(),
                )
                .then(a.endpoint.cmp(&b.endpoint))
        })
        .cloned()
        .expect("candidates non-empty")
}

fn best_availability(candidates: &[WorkerRecord]) -> WorkerRecord {
    candidates
        .iter()
        .max_by(|a, b| {
            let ratio_a = a.resources.cpus_available / a.resources.cpus_total;
            let ratio_b = b.resources.cpus_available / b.resources.cpus_total;
            ratio_a
                .partial_cmp(&ratio_b)
                .unwrap()
                .then(b.ewma_latency_ms.partial_cmp(&a.ewma_latency_ms).unwrap())
        })
        .cloned()
        .expect("candidates non-empty")
}

/// Keeps workers that are healthy and satisfy the resource/tag requirements.
/// Exposed standalone so `/price` can report matching workers without
/// scoring or advancing the round-robin cursor.
pub fn filter_candidates(reqs: &RequestRequirements, snapshot: &[WorkerRecord]) -> Vec<WorkerRecord> {
    snapshot.iter().filter(|w| fits(w, reqs)).cloned().collect()
}

/// Filters `snapshot` for resource/tag fit, then scores by `strategy`.
/// Returns `None` when no worker satisfies the filter.
pub fn select(
    reqs: &RequestRequirements,
    strategy: SelectionStrategy,
    snapshot: &[WorkerRecord],
    round_robin: &RoundRobinCounter,
) -> Option<WorkerRecord> {
    let mut candidates: Vec<WorkerRecord> = filter_candidates(reqs, snapshot);

    if candidates.is_empty() {
        return None;
    }

    // Stable, deterministic ordering so round-robin indexing is reproducible.
    candidates.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

    let chosen = match strategy {
        SelectionStrategy::BestPrice => best_price(&candidates, reqs),
        SelectionStrategy::BestLatency => best_latency(&candidates),
        SelectionStrategy::BestAvailability => best_availability(&candidates),
        SelectionStrategy::RoundRobin => round_robin.select_next(&candidates),
    };

    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zakuro_models::worker::{HardwareDescriptor, Pricing, Resources, WorkerStatus};

    fn worker(name: &str, price: f64, latency_ms: f64) -> WorkerRecord {
        WorkerRecord {
            name: name.to_string(),
            endpoint: format!("{name}:9000"),
            worker_type: "cpu".to_string(),
            resources: Resources {
                cpus_total: 4.0,
                cpus_available: 4.0,
                memory_total_bytes: 1 << 30,
                memory_available_bytes: 1 << 30,
                gpus_total: 0,
                gpus_available: 0,
            },
            pricing: Pricing {
                cpu_price_per_sec: price,
                memory_price_per_gib_sec: 0.0,
                gpu_price_per_sec: 0.0,
                min_charge: 0.0,
            },
            tags: vec![],
            hardware: HardwareDescriptor::default(),
            status: WorkerStatus::Healthy,
            last_seen_ms: 0,
            ewma_latency_ms: latency_ms,
            in_flight: 0,
            consecutive_probe_failures: 0,
        }
    }

    #[test]
    fn best_price_picks_cheaper_worker() {
        let snapshot = vec![worker("w1", 0.001, 50.0), worker("w2", 0.002, 10.0)];
        let reqs = RequestRequirements::default();
        let counter = RoundRobinCounter::new();
        let chosen = select(&reqs, SelectionStrategy::BestPrice, &snapshot, &counter).unwrap();
        assert_eq!(chosen.name, "w1");
    }

    #[test]
    fn best_latency_picks_lower_ewma() {
        let snapshot = vec![worker("w1", 0.001, 50.0), worker("w2", 0.002, 10.0)];
        let reqs = RequestRequirements::default();
        let counter = RoundRobinCounter::new();
        let chosen = select(&reqs, SelectionStrategy::BestLatency, &snapshot, &counter).unwrap();
        assert_eq!(chosen.name, "w2");
    }

    #[test]
    fn round_robin_cycles_and_advances_only_on_selection() {
        let snapshot = vec![worker("w1", 0.001, 1.0), worker("w2", 0.001, 1.0), worker("w3", 0.001, 1.0)];
        let reqs = RequestRequirements::default();
        let counter = RoundRobinCounter::new();
        let mut order = Vec::new();
        for _ in 0..9 {
            let chosen = select(&reqs, SelectionStrategy::RoundRobin, &snapshot, &counter).unwrap();
            order.push(chosen.name);
        }
        assert_eq!(
            order,
            vec!["w1", "w2", "w3", "w1", "w2", "w3", "w1", "w2", "w3"]
        );
    }

    #[test]
    fn round_robin_skips_worker_that_drops_out_mid_rotation() {
        let mut snapshot = vec![worker("w1", 0.001, 1.0), worker("w2", 0.001, 1.0), worker("w3", 0.001, 1.0)];
        let reqs = RequestRequirements::default();
        let counter = RoundRobinCounter::new();
        let mut order = Vec::new();
        for i in 0..9 {
            if i == 4 {
                snapshot[1].status = WorkerStatus::Unhealthy;
            }
            let chosen = select(&reqs, SelectionStrategy::RoundRobin, &snapshot, &counter).unwrap();
            order.push(chosen.name);
        }
        assert_eq!(
            order,
            vec!["w1", "w2", "w3", "w1", "w3", "w1", "w3", "w1", "w3"]
        );
    }

    #[test]
    fn empty_filtered_set_returns_none() {
        let reqs = RequestRequirements {
            cpus: 100.0,
            ..Default::default()
        };
        let counter = RoundRobinCounter::new();
        let snapshot = vec![worker("w1", 0.001, 1.0)];
        assert!(select(&reqs, SelectionStrategy::BestPrice, &snapshot, &counter).is_none());
    }
}
