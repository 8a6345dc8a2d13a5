// [apps/worker/src/lib.rs]
pub mod config;
pub mod function_registry;
pub mod handlers;
pub mod hardware;
pub mod instances;
pub mod state;

pub mod prelude {
    pub use crate::config::WorkerConfig;
    pub use crate::state::WorkerState;
}

use axum::routing::{get, post};
use axum::Router;

use crate::state::WorkerState;

pub fn router(state: WorkerState) -> Router {
    Router::new()
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route("/execute", post(handlers::execute))
        .with_state(state)
}
