pub mod error;
mod extract;
mod routes;

use axum::{routing::get, Router};
use finadvisor_core::market::MarketDataSource;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    /// `None` when the database could not be reached at boot; the API then runs degraded.
    pub pool: Option<SqlitePool>,
    pub market: MarketDataSource,
}

impl AppState {
    pub(crate) fn pool(&self) -> ApiResult<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable("database unavailable".to_string()))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(routes::users::router())
        .merge(routes::transactions::router())
        .merge(routes::categories::router())
        .merge(routes::budgets::router())
        .merge(routes::advice::router())
        .merge(routes::market::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests;
