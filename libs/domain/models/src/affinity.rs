// [libs/domain/models/src/affinity.rs]
use serde::{Deserialize, Serialize};

/// Binds a stateful `instance_id` to the worker that created it. All
/// calls for `instance_id` route to `worker_endpoint` while this entry
/// lives; it is evicted when the worker goes unhealthy or idles past TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityEntry {
    pub instance_id: String,
    pub worker_endpoint: String,
    pub created_at_ms: i64,
    pub last_used_ms: i64,
    pub owner_user_id: String,
}
