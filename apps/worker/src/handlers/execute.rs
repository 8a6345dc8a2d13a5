// [apps/worker/src/handlers/execute.rs]
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{instrument, warn};
use zakuro_protocol::{TaskEnvelope, TaskResponse};

use crate::function_registry;
use crate::instances::InstanceTable;
use crate::state::WorkerState;

/// `POST /execute`. Per the spec's load-bearing contract: task-level
/// failures are encoded inside a 200 response body; only transport-level
/// failures (malformed body, saturated pool) return non-2xx.
#[instrument(skip(state, body))]
pub async fn execute(State(state): State<WorkerState>, body: Bytes) -> Response {
    let permit = match state.execution_pool.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            warn!("execution pool saturated");
            return (StatusCode::SERVICE_UNAVAILABLE, "execution pool saturated").into_response();
        }
    };

    let envelope = match TaskEnvelope::decode(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(error = %err, "malformed task envelope");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let instances = state.instances.clone();
    let response = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        run_envelope(envelope, &instances)
    })
    .await
    .unwrap_or_else(|join_err| TaskResponse::error("WorkerPanicked", join_err.to_string()));

    let body = response.encode();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response()
}

fn run_envelope(envelope: TaskEnvelope, instances: &InstanceTable) -> TaskResponse {
    match envelope {
        TaskEnvelope::Execute { func, args, kwargs } => {
            let func_name = func.as_str().unwrap_or_default();
            match function_registry::dispatch(func_name, &args, &kwargs) {
                Ok(result) => TaskResponse::ok(result),
                Err(message) => TaskResponse::error("TaskError", message),
            }
        }
        TaskEnvelope::CreateInstance {
            instance_id,
            klass,
            ..
        } => {
            let class_name = klass.as_str().unwrap_or_default();
            match instances.create(class_name, instance_id) {
                Ok(created_id) => TaskResponse::instance_created(created_id),
                Err(message) => TaskResponse::error("TaskError", message),
            }
        }
        TaskEnvelope::CallMethod {
            instance_id,
            method,
            args,
            kwargs,
        } => match instances.call_method(&instance_id, &method, &args, &kwargs) {
            Ok(result) => TaskResponse::ok(result),
            Err(message) => TaskResponse::error("TaskError", message),
        },
    }
}
