use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/travellers/:band/:number/account", get(handlers::get_account))
        .route("/api/travellers/:band/:number/charts", get(handlers::get_charts))
        .route("/api/travellers/:band/:number/balance", get(handlers::get_balance))
        .route("/api/travellers/:band/:number/destinations", get(handlers::get_destinations))
        .route("/api/travellers/:band/:number/history", get(handlers::get_history))
        .with_state(state)
}
