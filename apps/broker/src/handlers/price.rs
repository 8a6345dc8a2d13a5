// [apps/broker/src/handlers/price.rs]
use axum::extract::State;
use axum::Json;
use serde_json::json;
use zakuro_models::requirements::RequestRequirements;
use zakuro_selector::filter_candidates;

use crate::state::AppState;

/// Advisory price estimate: filters the current snapshot for fit and
/// reports the cheapest/most expensive matching worker's projected cost.
pub async fn estimate_price(
    State(state): State<AppState>,
    Json(reqs): Json<RequestRequirements>,
) -> Json<serde_json::Value> {
    let snapshot = state.registry.snapshot();
    let matching = filter_candidates(&reqs, &snapshot);

    let costs: Vec<f64> = matching
        .iter()
        .map(|w| {
            w.pricing
                .project_cost(reqs.cpus, reqs.memory_bytes, reqs.gpus, reqs.estimated_duration_secs)
        })
        .collect();

    let min_cost = costs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_cost = costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Json(json!({
        "min_cost": if matching.is_empty() { 0.0 } else { min_cost },
        "max_cost": if matching.is_empty() { 0.0 } else { max_cost },
        "matching_workers": matching.len(),
    }))
}
