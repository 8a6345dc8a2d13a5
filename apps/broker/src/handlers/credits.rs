// [apps/broker/src/handlers/credits.rs]
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use zakuro_models::user::{credits_to_micros, micros_to_credits};

use crate::state::AppState;

pub async fn get_credits(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let record = state.ledger.user_record(&user_id);
    Json(json!({
        "user_id": record.user_id,
        "balance": record.balance_credits(),
        "total_spent": micros_to_credits(record.total_spent_micros),
        "rate_limit": record.rate_limit_rps,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AddCreditsRequest {
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

pub async fn add_credits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AddCreditsRequest>,
) -> Response {
    if payload.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "amount must be positive" })),
        )
            .into_response();
    }

    let amount_micros = credits_to_micros(payload.amount);
    let correlation_id = format!("deposit-{}", uuid::Uuid::new_v4());
    state.ledger.add(&user_id, amount_micros, &correlation_id);

    Json(json!({
        "user_id": user_id,
        "balance": micros_to_credits(state.ledger.balance_micros(&user_id)),
        "description": payload.description,
    }))
    .into_response()
}
