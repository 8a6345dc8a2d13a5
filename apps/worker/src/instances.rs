// [apps/worker/src/instances.rs]
//! The in-memory stateful instance table. `create_instance` constructs a
//! named class and stores it under a client-provided or server-generated
//! id; `call_method` looks it up and invokes a method by name. Mirrors
//! `original_source/zakuro/worker/executor.py`'s `_instances` dict and
//! `_instance_counter`, with instances held as a small closed set of
//! built-in classes rather than arbitrary deserialized objects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

pub enum Instance {
    Counter(i64),
    KeyValueStore(HashMap<String, Value>),
}

impl Instance {
    fn construct(klass: &str) -> Result<Self, String> {
        match klass {
            "Counter" => Ok(Instance::Counter(0)),
            "KeyValueStore" => Ok(Instance::KeyValueStore(HashMap::new())),
            other => Err(format!("unknown class: {other}")),
        }
    }

    fn call_method(&mut self, method: &str, args: &Value, _kwargs: &Value) -> Result<Value, String> {
        match (self, method) {
            (Instance::Counter(n), "increment") => {
                *n += 1;
                Ok(Value::from(*n))
            }
            (Instance::Counter(n), "value") => Ok(Value::from(*n)),
            (Instance::KeyValueStore(map), "set") => {
                let key = args
                    .as_array()
                    .and_then(|a| a.first())
                    .and_then(Value::as_str)
                    .ok_or("set expects a string key as the first argument")?
                    .to_string();
                let value = args
                    .as_array()
                    .and_then(|a| a.get(1))
                    .cloned()
                    .unwrap_or(Value::Null);
                map.insert(key, value);
                Ok(Value::Bool(true))
            }
            (Instance::KeyValueStore(map), "get") => {
                let key = args
                    .as_array()
                    .and_then(|a| a.first())
                    .and_then(Value::as_str)
                    .ok_or("get expects a string key as the first argument")?;
                Ok(map.get(key).cloned().unwrap_or(Value::Null))
            }
            (_, other) => Err(format!("unknown method: {other}")),
        }
    }
}

pub struct InstanceTable {
    instances: Mutex<HashMap<String, Instance>>,
    counter: AtomicU64,
}

impl Default for InstanceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceTable {
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Client-generated ids are honored verbatim; the server-generated
    /// form is a monotonically increasing `instance_{n}` counter.
    pub fn create(&self, klass: &str, requested_id: Option<String>) -> Result<String, String> {
        let instance = Instance::construct(klass)?;
        let instance_id = requested_id.unwrap_or_else(|| {
            let n = self.counter.fetch_add(1, Ordering::Relaxed);
            format!("instance_{n}")
        });
        self.instances
            .lock()
            .expect("LOCK_POISONED")
            .insert(instance_id.clone(), instance);
        Ok(instance_id)
    }

    pub fn call_method(
        &self,
        instance_id: &str,
        method: &str,
        args: &Value,
        kwargs: &Value,
    ) -> Result<Value, String> {
        let mut instances = self.instances.lock().expect("LOCK_POISONED");
        let instance = instances
            .get_mut(instance_id)
            .ok_or_else(|| format!("unknown instance: {instance_id}"))?;
        instance.call_method(method, args, kwargs)
    }
}
