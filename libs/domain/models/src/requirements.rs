// [libs/domain/models/src/requirements.rs]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    BestPrice,
    BestLatency,
    BestAvailability,
    RoundRobin,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::BestPrice
    }
}

/// Advisory for selection, authoritative for the pre-authorization
/// upper-bound cost (see `Pricing::project_cost`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestRequirements {
    pub cpus: f64,
    pub memory_bytes: u64,
    pub gpus: u32,
    pub estimated_duration_secs: f64,
    pub strategy: SelectionStrategy,
    pub tags: Vec<String>,
}

impl Default for RequestRequirements {
    fn default() -> Self {
        Self {
            cpus: 1.0,
            memory_bytes: 1024 * 1024 * 1024,
            gpus: 0,
            estimated_duration_secs: 1.0,
            strategy: SelectionStrategy::BestPrice,
            tags: Vec::new(),
        }
    }
}
