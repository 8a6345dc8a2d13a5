// [apps/broker/src/handlers/execute.rs]
//! The `/execute` pipeline: authenticate, parse requirements, select (or
//! reuse an affinity binding), reserve the pre-auth upper bound, forward
//! the opaque blob, settle on the observed duration, and return the
//! worker's bytes annotated with cost headers.

use axum::body::Bytes;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{instrument, warn};
use uuid::Uuid;
use zakuro_ledger::LedgerError;
use zakuro_models::requirements::RequestRequirements;
use zakuro_models::user::{credits_to_micros, micros_to_credits};
use zakuro_selector::select;

use crate::identity::Identity;
use crate::state::AppState;

const HEADER_REQUIREMENTS: &str = "X-Zakuro-Requirements";
const HEADER_INSTANCE_ACTION: &str = "X-Zakuro-Instance-Action";
const HEADER_INSTANCE_ID: &str = "X-Zakuro-Instance-Id";
const HEADER_COST: &str = "X-Zakuro-Cost";
const HEADER_CREDITS_REMAINING: &str = "X-Zakuro-Credits-Remaining";
const HEADER_WORKER: &str = "X-Zakuro-Worker";
const HEADER_DURATION_MS: &str = "X-Zakuro-Duration-Ms";

fn parse_requirements(headers: &HeaderMap) -> RequestRequirements {
    headers
        .get(HEADER_REQUIREMENTS)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

fn error_body(error_type: &str, message: impl Into<String>) -> Bytes {
    Bytes::from(
        serde_json::json!({ "error": { "error_type": error_type, "message": message.into() } })
            .to_string(),
    )
}

#[instrument(skip(state, headers, body), fields(user_id = %identity.user_id))]
pub async fn execute(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reqs = parse_requirements(&headers);
    let instance_action = headers
        .get(HEADER_INSTANCE_ACTION)
        .and_then(|v| v.to_str().ok());
    let instance_id = headers.get(HEADER_INSTANCE_ID).and_then(|v| v.to_str().ok());

    let endpoint = match (instance_action, instance_id) {
        (Some("call_method"), Some(instance_id)) => {
            let registry = state.registry.clone();
            match state
                .affinity
                .lookup(instance_id, |endpoint| registry.is_healthy(endpoint))
            {
                Ok(endpoint) => endpoint,
                Err(_) => {
                    return (StatusCode::GONE, error_body("AffinityLost", "instance affinity lost"))
                        .into_response();
                }
            }
        }
        _ => {
            let snapshot = state.registry.snapshot();
            match select(&reqs, reqs.strategy, &snapshot, &state.round_robin) {
                Some(worker) => worker.endpoint,
                None => {
                    return (
                        StatusCode::SERVICE_UNAVAILABLE,
                        error_body("NoWorkersAvailable", "no worker satisfies the request"),
                    )
                        .into_response();
                }
            }
        }
    };

    let Some(worker) = state.registry.get(&endpoint) else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body("NoWorkersAvailable", "selected worker vanished"),
        )
            .into_response();
    };

    let max_cost_credits = worker.pricing.project_cost(
        reqs.cpus,
        reqs.memory_bytes,
        reqs.gpus,
        reqs.estimated_duration_secs,
    );
    let max_cost_micros = credits_to_micros(max_cost_credits);
    let correlation_id = Uuid::new_v4().to_string();

    if let Err(err) = state.ledger.reserve(&identity.user_id, max_cost_micros, &correlation_id) {
        return match err {
            LedgerError::InsufficientCredits { .. } => (
                StatusCode::PAYMENT_REQUIRED,
                error_body("InsufficientCredits", err.to_string()),
            )
                .into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, error_body("LedgerError", other.to_string()))
                .into_response(),
        };
    }

    state.registry.increment_in_flight(&endpoint);
    let forward_result = state
        .transport
        .forward_execute(&endpoint, body.to_vec(), "application/octet-stream")
        .await;
    state.registry.decrement_in_flight(&endpoint);

    let (response_bytes, observed_duration) = match forward_result {
        Ok(result) => result,
        Err(err) => {
            warn!(endpoint, error = %err, "worker forward failed");
            let _ = state.ledger.refund(&correlation_id);
            state.registry.mark_unhealthy(&endpoint);
            return (
                StatusCode::BAD_GATEWAY,
                error_body("WorkerUnreachable", err.to_string()),
            )
                .into_response();
        }
    };

    let duration_secs = observed_duration.as_secs_f64();
    let projected_cost_credits = worker
        .pricing
        .project_cost(reqs.cpus, reqs.memory_bytes, reqs.gpus, duration_secs);
    let actual_cost_micros = credits_to_micros(projected_cost_credits).min(max_cost_micros);
    let actual_cost_credits = micros_to_credits(actual_cost_micros);

    if let Err(err) = state.ledger.settle(&correlation_id, actual_cost_micros) {
        warn!(error = %err, "settlement failed after a successful forward");
    }

    if instance_action.is_none() {
        if let Some(new_instance_id) = zakuro_protocol::peek_instance_id(&response_bytes) {
            state.affinity.create(&new_instance_id, &endpoint, &identity.user_id);
        }
    }

    let remaining_credits = micros_to_credits(state.ledger.balance_micros(&identity.user_id));

    let mut response = (StatusCode::OK, response_bytes).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        HEADER_COST,
        HeaderValue::from_str(&format!("{actual_cost_credits:.6}")).unwrap(),
    );
    response_headers.insert(
        HEADER_CREDITS_REMAINING,
        HeaderValue::from_str(&format!("{remaining_credits:.6}")).unwrap(),
    );
    response_headers.insert(HEADER_WORKER, HeaderValue::from_str(&worker.name).unwrap());
    response_headers.insert(
        HEADER_DURATION_MS,
        HeaderValue::from_str(&(duration_secs * 1000.0).round().to_string()).unwrap(),
    );
    response
}
