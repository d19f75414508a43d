use axum::{extract::State, routing::get, Json, Router};
use finadvisor_core::market::types::MarketSnapshot;

use crate::AppState;

/// Never fails: provider outages show up as `fallback` sources in the body.
async fn get_snapshot(State(state): State<AppState>) -> Json<MarketSnapshot> {
    Json(state.market.snapshot().await)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/market/snapshot", get(get_snapshot))
}
