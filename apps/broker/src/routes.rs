// [apps/broker/src/routes.rs]
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::auth_guard;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/execute", post(handlers::execute))
        .route("/workers", get(handlers::list_workers))
        .route("/credits/:user_id", get(handlers::get_credits))
        .route("/credits/:user_id/add", post(handlers::add_credits))
        .route("/price", post(handlers::estimate_price))
        .route("/me", get(handlers::whoami))
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn(auth_guard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
