// [apps/broker/src/services/registry_reaper.rs]
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

const REAP_TICK: Duration = Duration::from_secs(30);

/// Removes workers whose `last_seen` exceeds `worker_expire_secs`,
/// independent of the consecutive-failure removal path in the registry
/// itself (covers a peer that stops responding to TCP entirely).
pub fn spawn_registry_reaper(state: AppState) {
    let expire_ms = Duration::from_secs(state.config.worker_expire_secs).as_millis() as i64;
    let mut ticker = interval(REAP_TICK);

    tokio::spawn(async move {
        info!("registry reaper started");
        loop {
            ticker.tick().await;
            let removed = state.registry.remove_expired(expire_ms);
            if removed > 0 {
                warn!(count = removed, "removed expired workers from registry");
            }
        }
    });
}
