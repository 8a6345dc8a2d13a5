// [apps/broker/src/handlers/me.rs]
use axum::extract::{Extension, State};
use axum::Json;
use serde_json::json;
use zakuro_models::user::micros_to_credits;

use crate::identity::Identity;
use crate::state::AppState;

pub async fn whoami(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> Json<serde_json::Value> {
    let balance_micros = state.ledger.balance_micros(&identity.user_id);
    Json(json!({
        "user_id": identity.user_id,
        "balance": micros_to_credits(balance_micros),
        "ledger_connected": !state.local_mode(),
        "local_mode": state.local_mode(),
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}
