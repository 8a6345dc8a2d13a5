// [libs/domain/affinity/src/lib.rs]
//! Maps `instance_id -> worker_endpoint` for stateful instances. Created
//! on `create_instance`, looked up on `call_method`; evicted when the
//! owning worker goes unhealthy or idles past TTL.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use zakuro_models::affinity::AffinityEntry;

#[derive(Debug, thiserror::Error)]
pub enum AffinityError {
    #[error("no affinity entry for instance {0}")]
    NotFound(String),
    #[error("affinity lost: worker for instance {0} is no longer healthy")]
    AffinityLost(String),
}

pub struct AffinityTable {
    entries: RwLock<HashMap<String, AffinityEntry>>,
}

impl Default for AffinityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AffinityTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self, instance_id: &str, worker_endpoint: &str, owner_user_id: &str) {
        let now = Utc::now().timestamp_millis();
        self.entries.write().expect("LOCK_POISONED").insert(
            instance_id.to_string(),
            AffinityEntry {
                instance_id: instance_id.to_string(),
                worker_endpoint: worker_endpoint.to_string(),
                created_at_ms: now,
                last_used_ms: now,
                owner_user_id: owner_user_id.to_string(),
            },
        );
    }

    /// Looks up the worker bound to `instance_id`. Does not validate
    /// health itself — callers pass `is_worker_healthy` so this crate
    /// stays free of any dependency on the registry.
    pub fn lookup(
        &self,
        instance_id: &str,
        is_worker_healthy: impl Fn(&str) -> bool,
    ) -> Result<String, AffinityError> {
        let mut entries = self.entries.write().expect("LOCK_POISONED");
        let entry = entries
            .get_mut(instance_id)
            .ok_or_else(|| AffinityError::NotFound(instance_id.to_string()))?;

        if !is_worker_healthy(&entry.worker_endpoint) {
            return Err(AffinityError::AffinityLost(instance_id.to_string()));
        }

        entry.last_used_ms = Utc::now().timestamp_millis();
        Ok(entry.worker_endpoint.clone())
    }

    pub fn evict_idle(&self, idle_ttl_ms: i64) -> usize {
        let now = Utc::now().timestamp_millis();
        let mut entries = self.entries.write().expect("LOCK_POISONED");
        let before = entries.len();
        entries.retain(|_, entry| now - entry.last_used_ms <= idle_ttl_ms);
        before - entries.len()
    }

    pub fn evict_for_worker(&self, worker_endpoint: &str) -> usize {
        let mut entries = self.entries.write().expect("LOCK_POISONED");
        let before = entries.len();
        entries.retain(|_, entry| entry.worker_endpoint != worker_endpoint);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("LOCK_POISONED").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_method_routes_to_creating_worker() {
        let table = AffinityTable::new();
        table.create("inst_A", "w1:9000", "u1");
        let endpoint = table.lookup("inst_A", |_| true).unwrap();
        assert_eq!(endpoint, "w1:9000");
    }

    #[test]
    fn unhealthy_owning_worker_yields_affinity_lost() {
        let table = AffinityTable::new();
        table.create("inst_A", "w1:9000", "u1");
        let err = table.lookup("inst_A", |_| false).unwrap_err();
        assert!(matches!(err, AffinityError::AffinityLost(_)));
    }

    #[test]
    fn idle_entries_evicted_after_ttl() {
        let table = AffinityTable::new();
        table.create("inst_A", "w1:9000", "u1");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let evicted = table.evict_idle(0);
        assert_eq!(evicted, 1);
        assert!(table.lookup("inst_A", |_| true).is_err());
    }
}
