// [libs/core/protocol/src/lib.rs]
//! The wire format carried as an opaque byte blob between broker and
//! worker. The broker never parses this except to call
//! [`peek_instance_id`] on a `create_instance` response; everything else
//! is forwarded untouched (`application/octet-stream` in, same bytes out).
//!
//! Resolves the "opaque serialization format" non-goal by fixing a
//! concrete, JSON-based encoding: a named function/class registry instead
//! of serialized closures, since arbitrary executable payloads have no
//! safe Rust equivalent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("call_method envelope missing instance_id")]
    MissingInstanceId,
}

/// Raw wire shape before action-inference, mirroring the three envelope
/// forms verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RawEnvelope {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    func: Option<Value>,
    #[serde(default)]
    klass: Option<Value>,
    #[serde(default)]
    instance_id: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    args: Value,
    #[serde(default)]
    kwargs: Value,
}

/// The three action shapes a worker dispatches on.
#[derive(Debug, Clone)]
pub enum TaskEnvelope {
    Execute {
        func: Value,
        args: Value,
        kwargs: Value,
    },
    CreateInstance {
        instance_id: Option<String>,
        klass: Value,
        args: Value,
        kwargs: Value,
    },
    CallMethod {
        instance_id: String,
        method: String,
        args: Value,
        kwargs: Value,
    },
}

impl TaskEnvelope {
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let raw: RawEnvelope = serde_json::from_slice(bytes)?;
        let action = raw.action.clone().unwrap_or_else(|| "execute".to_string());

        let envelope = match action.as_str() {
            "create_instance" => TaskEnvelope::CreateInstance {
                instance_id: raw.instance_id,
                klass: raw.klass.unwrap_or(Value::Null),
                args: raw.args,
                kwargs: raw.kwargs,
            },
            "call_method" => TaskEnvelope::CallMethod {
                instance_id: raw.instance_id.ok_or(ProtocolError::MissingInstanceId)?,
                method: raw.method.unwrap_or_default(),
                args: raw.args,
                kwargs: raw.kwargs,
            },
            _ => TaskEnvelope::Execute {
                func: raw.func.unwrap_or(Value::Null),
                args: raw.args,
                kwargs: raw.kwargs,
            },
        };
        Ok(envelope)
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            TaskEnvelope::Execute { .. } => "execute",
            TaskEnvelope::CreateInstance { .. } => "create_instance",
            TaskEnvelope::CallMethod { .. } => "call_method",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskErrorBody {
    pub error_type: String,
    pub message: String,
}

/// The response envelope. Failures are never raised as transport errors —
/// they are encoded here and returned with HTTP 200 (spec's load-bearing
/// "charge for compute that ran and failed" rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskResponse {
    Error { error: TaskErrorBody },
    InstanceCreated { instance_id: String },
    Result { result: Value },
}

impl TaskResponse {
    pub fn ok(result: Value) -> Self {
        TaskResponse::Result { result }
    }

    pub fn instance_created(instance_id: impl Into<String>) -> Self {
        TaskResponse::InstanceCreated {
            instance_id: instance_id.into(),
        }
    }

    pub fn error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        TaskResponse::Error {
            error: TaskErrorBody {
                error_type: error_type.into(),
                message: message.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TaskResponse::Error { .. })
    }

    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("TaskResponse serialization cannot fail")
    }
}

/// Extracts `instance_id` from a raw response body without fully decoding
/// it into a typed `TaskResponse` — this is the only introspection the
/// broker ever performs on a worker's reply.
pub fn peek_instance_id(response_bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(response_bytes).ok()?;
    value.get("instance_id")?.as_str().map(str::to_string)
}
