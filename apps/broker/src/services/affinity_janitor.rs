// [apps/broker/src/services/affinity_janitor.rs]
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

const JANITOR_TICK: Duration = Duration::from_secs(60);

/// Evicts affinity entries idle past `instance_ttl_secs`.
pub fn spawn_affinity_janitor(state: AppState) {
    let idle_ttl_ms = Duration::from_secs(state.config.instance_ttl_secs).as_millis() as i64;
    let mut ticker = interval(JANITOR_TICK);

    tokio::spawn(async move {
        info!("affinity janitor started");
        loop {
            ticker.tick().await;
            let evicted = state.affinity.evict_idle(idle_ttl_ms);
            if evicted > 0 {
                warn!(count = evicted, "evicted idle affinity entries");
            }
        }
    });
}
