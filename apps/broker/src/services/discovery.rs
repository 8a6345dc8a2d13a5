// [apps/broker/src/services/discovery.rs]
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};
use zakuro_registry::ProbeSample;

use crate::state::AppState;

const PROBE_DEADLINE: Duration = Duration::from_secs(2);

/// A ticker at `discovery_interval` iterating the peer list and invoking
/// `/info` probes in parallel. The only writer of the worker registry.
pub fn spawn_discovery_loop(state: AppState) {
    let interval_duration = Duration::from_secs(state.config.discovery_interval_secs);
    let mut ticker = interval(interval_duration);
    let peers = state.config.peer_list();

    tokio::spawn(async move {
        info!(peer_count = peers.len(), "peer discovery loop started");
        loop {
            ticker.tick().await;

            let probes = peers.iter().map(|endpoint| {
                let state = state.clone();
                let endpoint = endpoint.clone();
                async move {
                    match tokio::time::timeout(PROBE_DEADLINE, state.transport.probe_info(&endpoint)).await {
                        Ok(Ok((info, rtt))) => {
                            state.registry.upsert_from_probe(
                                &endpoint,
                                ProbeSample {
                                    name: info.name,
                                    worker_type: info.worker_type,
                                    resources: zakuro_models::worker::Resources {
                                        cpus_total: info.resources.cpus_total,
                                        cpus_available: info.resources.cpus_available,
                                        memory_total_bytes: info.resources.memory_total,
                                        memory_available_bytes: info.resources.memory_available,
                                        gpus_total: info.resources.gpus_total,
                                        gpus_available: info.resources.gpus_available,
                                    },
                                    pricing: zakuro_models::worker::Pricing {
                                        cpu_price_per_sec: info.pricing.cpu_price,
                                        memory_price_per_gib_sec: info.pricing.memory_price,
                                        gpu_price_per_sec: info.pricing.gpu_price,
                                        min_charge: info.pricing.min_charge,
                                    },
                                    tags: info.tags,
                                    hardware: zakuro_models::worker::HardwareDescriptor {
                                        cpu_model: info.hardware.cpu_model,
                                        gpu_model: info.hardware.gpu_model,
                                        gpu_vram_gb: info.hardware.gpu_vram_gb,
                                        storage_gb: info.hardware.storage_gb,
                                    },
                                    rtt_ms: rtt.as_secs_f64() * 1000.0,
                                },
                            );
                        }
                        _ => {
                            warn!(endpoint, "discovery probe failed");
                            state.registry.mark_probe_failure(&endpoint);
                        }
                    }
                }
            });

            futures::future::join_all(probes).await;
        }
    });
}
