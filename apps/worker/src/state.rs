// [apps/worker/src/state.rs]
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::config::WorkerConfig;
use crate::instances::InstanceTable;

/// Shared state for every handler. `execution_pool` bounds concurrent
/// `/execute` calls to `num_cpus::get()`, implementing the spec's
/// thread-pool-sized execution model.
#[derive(Clone)]
pub struct WorkerState {
    pub config: Arc<WorkerConfig>,
    pub execution_pool: Arc<Semaphore>,
    pub instances: Arc<InstanceTable>,
    pub started_at_ms: i64,
}

impl WorkerState {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config: Arc::new(config),
            execution_pool: Arc::new(Semaphore::new(num_cpus::get())),
            instances: Arc::new(InstanceTable::new()),
            started_at_ms: Utc::now().timestamp_millis(),
        }
    }
}
